// Worker - Phase cycle run loop

pub mod constants;
mod phases;
mod shutdown;

pub use phases::{AwaitToggleHandler, PhaseHandler, RunningHandler, StartupHandler};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::machine::PhaseMachine;
use crate::domain::{Phase, Trigger};
use crate::error::{AppError, Result};
use crate::port::{JobRunner, ToggleSource};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Drives the phase cycle: owns the machine, maps phases to their entry
/// handlers, and fires the trigger each handler returns.
///
/// Entry handlers are evaluated to completion one at a time on the
/// worker's own task, so no two phases ever overlap and transitions are
/// serialized by construction.
pub struct Worker {
    machine: PhaseMachine,
    handlers: HashMap<Phase, Arc<dyn PhaseHandler>>,
    reachable: HashSet<Phase>,
}

impl Worker {
    /// Create an unconfigured worker parked in `initial`
    pub fn new(initial: Phase) -> Self {
        let mut reachable = HashSet::new();
        reachable.insert(initial);
        Self {
            machine: PhaseMachine::new(initial),
            handlers: HashMap::new(),
            reachable,
        }
    }

    /// Register a phase's entry handler together with its outgoing edges.
    ///
    /// Must be called exactly once per phase before [`run`](Self::run);
    /// configuring a phase twice or registering a duplicate edge is a
    /// setup error.
    pub fn configure(
        &mut self,
        phase: Phase,
        handler: Arc<dyn PhaseHandler>,
        edges: &[(Trigger, Phase)],
    ) -> Result<()> {
        if self.handlers.contains_key(&phase) {
            return Err(AppError::Config(format!(
                "Phase {phase} configured more than once"
            )));
        }
        for &(trigger, to) in edges {
            self.machine.permit(phase, trigger, to)?;
            self.reachable.insert(to);
        }
        self.handlers.insert(phase, handler);
        Ok(())
    }

    /// Wire the standard four-phase toggle cycle:
    /// Startup -> WaitingForReset -> WaitingToRun -> Running -> WaitingForReset -> ...
    pub fn toggle_cycle(
        toggle: Arc<dyn ToggleSource>,
        job: Arc<dyn JobRunner>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let mut worker = Self::new(Phase::Startup);
        worker.configure(
            Phase::Startup,
            Arc::new(StartupHandler),
            &[(Trigger::Start, Phase::WaitingForReset)],
        )?;
        worker.configure(
            Phase::WaitingForReset,
            Arc::new(AwaitToggleHandler::until_unset(
                Arc::clone(&toggle),
                poll_interval,
            )),
            &[(Trigger::Reset, Phase::WaitingToRun)],
        )?;
        worker.configure(
            Phase::WaitingToRun,
            Arc::new(AwaitToggleHandler::until_set(toggle, poll_interval)),
            &[(Trigger::Set, Phase::Running)],
        )?;
        worker.configure(
            Phase::Running,
            Arc::new(RunningHandler::new(job)),
            &[(Trigger::JobFinished, Phase::WaitingForReset)],
        )?;
        Ok(worker)
    }

    /// Phase the machine is currently parked in
    pub fn current_phase(&self) -> Phase {
        self.machine.current()
    }

    /// Run the cycle until a handler observes cancellation (or an edge
    /// turns out to be missing, see below).
    ///
    /// The initial phase's handler runs exactly once on activation. Each
    /// iteration evaluates the current phase's handler to completion,
    /// then fires the trigger it returned. A handler returning `None`
    /// parks the worker in its current phase; no teardown transition is
    /// fired. An invalid transition is reported with the current phase
    /// and the attempted trigger and also parks the worker; the hosting
    /// process stays up either way.
    pub async fn run(&mut self, mut shutdown: ShutdownToken) -> Result<()> {
        self.validate()?;
        info!(phase = %self.machine.current(), "Worker activated");

        loop {
            let phase = self.machine.current();
            let handler = Arc::clone(
                self.handlers
                    .get(&phase)
                    .ok_or_else(|| AppError::Internal(format!("No handler for phase {phase}")))?,
            );

            info!(%phase, "Entering phase");
            let Some(trigger) = handler.on_enter(&mut shutdown).await else {
                info!(%phase, "Worker halted without firing a trigger");
                return Ok(());
            };

            info!(%phase, %trigger, "Firing trigger");
            if let Err(e) = self.machine.fire(trigger) {
                error!(%phase, %trigger, error = %e, "Invalid transition, worker parked");
                return Ok(());
            }
        }
    }

    /// Every phase reachable through the edge map (and the initial
    /// phase) must have a handler before the loop starts.
    fn validate(&self) -> Result<()> {
        for phase in &self.reachable {
            if !self.handlers.contains_key(phase) {
                return Err(AppError::Config(format!(
                    "No handler configured for phase {phase}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Handler that always parks (simulates observed cancellation)
    struct ParkHandler;

    #[async_trait]
    impl PhaseHandler for ParkHandler {
        async fn on_enter(&self, _shutdown: &mut ShutdownToken) -> Option<Trigger> {
            None
        }
    }

    /// Handler that always fires a fixed trigger
    struct FireHandler(Trigger);

    #[async_trait]
    impl PhaseHandler for FireHandler {
        async fn on_enter(&self, _shutdown: &mut ShutdownToken) -> Option<Trigger> {
            Some(self.0)
        }
    }

    #[tokio::test]
    async fn test_configure_twice_is_rejected() {
        let mut worker = Worker::new(Phase::Startup);
        worker
            .configure(
                Phase::Startup,
                Arc::new(ParkHandler),
                &[(Trigger::Start, Phase::WaitingForReset)],
            )
            .unwrap();

        let err = worker
            .configure(Phase::Startup, Arc::new(ParkHandler), &[])
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_requires_handler_for_reachable_phases() {
        let mut worker = Worker::new(Phase::Startup);
        // Edge to WaitingForReset but no handler registered there
        worker
            .configure(
                Phase::Startup,
                Arc::new(FireHandler(Trigger::Start)),
                &[(Trigger::Start, Phase::WaitingForReset)],
            )
            .unwrap();

        let (_tx, token) = shutdown_channel();
        let err = worker.run(token).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_loop_advances_then_parks() {
        let mut worker = Worker::new(Phase::Startup);
        worker
            .configure(
                Phase::Startup,
                Arc::new(FireHandler(Trigger::Start)),
                &[(Trigger::Start, Phase::WaitingForReset)],
            )
            .unwrap();
        worker
            .configure(Phase::WaitingForReset, Arc::new(ParkHandler), &[])
            .unwrap();

        let (_tx, token) = shutdown_channel();
        worker.run(token).await.unwrap();
        assert_eq!(worker.current_phase(), Phase::WaitingForReset);
    }

    #[tokio::test]
    async fn test_handler_firing_unpermitted_trigger_parks_without_moving() {
        let mut worker = Worker::new(Phase::Startup);
        // Handler fires Reset, but Startup only permits Start
        worker
            .configure(
                Phase::Startup,
                Arc::new(FireHandler(Trigger::Reset)),
                &[(Trigger::Start, Phase::WaitingForReset)],
            )
            .unwrap();
        worker
            .configure(Phase::WaitingForReset, Arc::new(ParkHandler), &[])
            .unwrap();

        let (_tx, token) = shutdown_channel();
        worker.run(token).await.unwrap();
        assert_eq!(worker.current_phase(), Phase::Startup);
    }
}
