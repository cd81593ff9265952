// Job Runner Port
// Abstraction for the unit of recurring work executed in the Running phase

use crate::application::worker::ShutdownToken;
use async_trait::async_trait;
use thiserror::Error;

/// Job execution errors
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job failed: {0}")]
    Failed(String),

    #[error("Job panicked: {0}")]
    Panicked(String),
}

/// Job Runner trait
///
/// One invocation performs one unit of recurring work. Implementations
/// must be substitutable without changing the shape of the phase cycle.
///
/// The shutdown token is passed for implementations that want to abort
/// long work early; the Running phase itself does not observe it (the
/// job always runs to completion once entered).
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Execute one unit of work
    ///
    /// # Errors
    /// - JobError::Failed if the work could not be completed
    async fn run(&self, shutdown: ShutdownToken) -> Result<(), JobError>;
}

/// Production stand-in: a fixed delay in place of real work.
pub struct FixedDelayJob {
    duration: std::time::Duration,
}

impl FixedDelayJob {
    pub fn new(duration: std::time::Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl JobRunner for FixedDelayJob {
    async fn run(&self, _shutdown: ShutdownToken) -> Result<(), JobError> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock job behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Job Runner for testing
    pub struct MockJobRunner {
        behavior: Mutex<MockBehavior>,
        call_count: AtomicUsize,
    }

    impl MockJobRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobRunner for MockJobRunner {
        async fn run(&self, _shutdown: ShutdownToken) -> Result<(), JobError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(JobError::Failed(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
