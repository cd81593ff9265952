// Phase Handlers - entry behavior for each phase of the toggle cycle

use crate::application::worker::ShutdownToken;
use crate::domain::{Phase, Trigger};
use crate::port::{JobRunner, ToggleSource};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

/// Entry behavior of a phase.
///
/// A handler runs to completion and either names the trigger to fire
/// next, or returns `None` when it observed cancellation, in which case
/// the worker parks in the current phase without transitioning.
#[async_trait]
pub trait PhaseHandler: Send + Sync {
    async fn on_enter(&self, shutdown: &mut ShutdownToken) -> Option<Trigger>;
}

/// Startup runs once: park if shutdown was requested before the worker
/// ever got going, otherwise fire Start.
pub struct StartupHandler;

#[async_trait]
impl PhaseHandler for StartupHandler {
    async fn on_enter(&self, shutdown: &mut ShutdownToken) -> Option<Trigger> {
        if shutdown.is_shutdown() {
            return None;
        }
        Some(Trigger::Start)
    }
}

/// Which toggle predicate a polling phase waits on
#[derive(Debug, Clone, Copy)]
enum ToggleCondition {
    Unset,
    Set,
}

/// Polling handler for the two waiting phases.
///
/// Evaluates one toggle predicate each poll interval until it holds,
/// then fires the configured trigger. Cancellation is checked at every
/// iteration boundary, and the inter-poll sleep is interruptible, so
/// observation latency is bounded by the poll interval.
pub struct AwaitToggleHandler {
    toggle: Arc<dyn ToggleSource>,
    condition: ToggleCondition,
    fires: Trigger,
    phase: Phase,
    poll_interval: Duration,
}

impl AwaitToggleHandler {
    /// WaitingForReset: wait for the toggle to be un-set, then fire Reset
    pub fn until_unset(toggle: Arc<dyn ToggleSource>, poll_interval: Duration) -> Self {
        Self {
            toggle,
            condition: ToggleCondition::Unset,
            fires: Trigger::Reset,
            phase: Phase::WaitingForReset,
            poll_interval,
        }
    }

    /// WaitingToRun: wait for the toggle to be set, then fire Set
    pub fn until_set(toggle: Arc<dyn ToggleSource>, poll_interval: Duration) -> Self {
        Self {
            toggle,
            condition: ToggleCondition::Set,
            fires: Trigger::Set,
            phase: Phase::WaitingToRun,
            poll_interval,
        }
    }

    async fn evaluate(&self) -> bool {
        match self.condition {
            ToggleCondition::Unset => self.toggle.is_unset().await,
            ToggleCondition::Set => self.toggle.is_set().await,
        }
    }
}

#[async_trait]
impl PhaseHandler for AwaitToggleHandler {
    async fn on_enter(&self, shutdown: &mut ShutdownToken) -> Option<Trigger> {
        debug!(phase = %self.phase, condition = ?self.condition, "Listening for toggle");
        loop {
            if shutdown.is_shutdown() {
                debug!(phase = %self.phase, "Cancellation observed before poll");
                return None;
            }

            let satisfied = self.evaluate().await;
            debug!(
                phase = %self.phase,
                condition = ?self.condition,
                satisfied,
                "Toggle poll"
            );
            if satisfied {
                return Some(self.fires);
            }

            debug!(
                phase = %self.phase,
                sleep_secs = self.poll_interval.as_secs_f64(),
                "Sleeping until next poll"
            );
            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = shutdown.wait() => {
                    debug!(phase = %self.phase, "Cancellation observed during wait");
                    return None;
                }
            }
        }
    }
}

/// Running executes the job once to completion and always fires
/// JobFinished afterwards, regardless of the toggle or job outcome.
///
/// Cancellation is not consulted before or during job execution, so a
/// shutdown request issued mid-job is only observed by the next polling
/// phase. The job runs on its own task, so a panicking job is contained
/// and never takes the worker down.
pub struct RunningHandler {
    job: Arc<dyn JobRunner>,
}

impl RunningHandler {
    pub fn new(job: Arc<dyn JobRunner>) -> Self {
        Self { job }
    }
}

#[async_trait]
impl PhaseHandler for RunningHandler {
    async fn on_enter(&self, shutdown: &mut ShutdownToken) -> Option<Trigger> {
        let job = Arc::clone(&self.job);
        let token = shutdown.clone();
        let handle = tokio::task::spawn(async move { job.run(token).await });

        match handle.await {
            Ok(Ok(())) => debug!("Job completed"),
            Ok(Err(e)) => error!(error = %e, "Job failed, continuing cycle"),
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(error = %join_err, "Job panicked, continuing cycle");
                } else {
                    error!(error = %join_err, "Job task cancelled, continuing cycle");
                }
            }
        }

        Some(Trigger::JobFinished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::worker::shutdown_channel;
    use crate::port::job_runner::mocks::MockJobRunner;
    use crate::port::toggle_source::mocks::MockToggle;

    #[tokio::test]
    async fn test_startup_fires_start() {
        let (_tx, mut token) = shutdown_channel();
        assert_eq!(
            StartupHandler.on_enter(&mut token).await,
            Some(Trigger::Start)
        );
    }

    #[tokio::test]
    async fn test_startup_parks_when_already_cancelled() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();
        assert_eq!(StartupHandler.on_enter(&mut token).await, None);
    }

    #[tokio::test]
    async fn test_unset_condition_fires_reset_on_first_poll() {
        let (_tx, mut token) = shutdown_channel();
        let toggle = Arc::new(MockToggle::new(true, false));
        let handler = AwaitToggleHandler::until_unset(
            Arc::clone(&toggle) as Arc<dyn ToggleSource>,
            Duration::from_millis(10),
        );

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::Reset));
        assert_eq!(toggle.query_count(), 1);
    }

    #[tokio::test]
    async fn test_set_condition_fires_set_on_first_poll() {
        let (_tx, mut token) = shutdown_channel();
        let toggle = Arc::new(MockToggle::new(false, true));
        let handler = AwaitToggleHandler::until_set(
            Arc::clone(&toggle) as Arc<dyn ToggleSource>,
            Duration::from_millis(10),
        );

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::Set));
        assert_eq!(toggle.query_count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_before_first_poll_skips_toggle_entirely() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();
        let toggle = Arc::new(MockToggle::new_open());
        let handler = AwaitToggleHandler::until_unset(
            Arc::clone(&toggle) as Arc<dyn ToggleSource>,
            Duration::from_millis(10),
        );

        assert_eq!(handler.on_enter(&mut token).await, None);
        assert_eq!(toggle.query_count(), 0);
    }

    #[tokio::test]
    async fn test_polling_advances_once_condition_flips() {
        let (_tx, mut token) = shutdown_channel();
        let toggle = Arc::new(MockToggle::new_closed());
        let handler = AwaitToggleHandler::until_set(
            Arc::clone(&toggle) as Arc<dyn ToggleSource>,
            Duration::from_millis(5),
        );

        let flipper = Arc::clone(&toggle);
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            flipper.set_set(true);
        });

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::Set));
        assert!(toggle.query_count() >= 2, "expected at least one re-poll");
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_poll_sleep() {
        let (tx, mut token) = shutdown_channel();
        let toggle = Arc::new(MockToggle::new_closed());
        // Long interval: only the interruptible wait lets this finish quickly
        let handler = AwaitToggleHandler::until_unset(
            Arc::clone(&toggle) as Arc<dyn ToggleSource>,
            Duration::from_secs(60),
        );

        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            tx.shutdown();
        });

        assert_eq!(handler.on_enter(&mut token).await, None);
        assert_eq!(toggle.query_count(), 1);
    }

    #[tokio::test]
    async fn test_running_fires_job_finished_on_success() {
        let (_tx, mut token) = shutdown_channel();
        let job = Arc::new(MockJobRunner::new_success());
        let handler = RunningHandler::new(Arc::clone(&job) as Arc<dyn JobRunner>);

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::JobFinished));
        assert_eq!(job.call_count(), 1);
    }

    #[tokio::test]
    async fn test_running_fires_job_finished_on_failure() {
        let (_tx, mut token) = shutdown_channel();
        let job = Arc::new(MockJobRunner::new_fail("disk on fire"));
        let handler = RunningHandler::new(Arc::clone(&job) as Arc<dyn JobRunner>);

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::JobFinished));
    }

    #[tokio::test]
    async fn test_running_survives_job_panic() {
        let (_tx, mut token) = shutdown_channel();
        let job = Arc::new(MockJobRunner::new_panic_inducing("boom"));
        let handler = RunningHandler::new(Arc::clone(&job) as Arc<dyn JobRunner>);

        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::JobFinished));
    }

    #[tokio::test]
    async fn test_running_ignores_pre_set_cancellation() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();
        let job = Arc::new(MockJobRunner::new_success());
        let handler = RunningHandler::new(Arc::clone(&job) as Arc<dyn JobRunner>);

        // Documented limitation: Running does not consult cancellation
        assert_eq!(handler.on_enter(&mut token).await, Some(Trigger::JobFinished));
        assert_eq!(job.call_count(), 1);
    }
}
