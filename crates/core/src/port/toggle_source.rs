// Toggle Source Port
// Abstraction over the external gating flag consulted by the polling phases

use crate::port::TimeProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Query-style gating capability.
///
/// Both predicates are side-effect-free and callable once per poll
/// interval. Implementations:
/// - MinuteParityToggle: clock-minute parity (stand-in for a real flag
///   provider)
/// - a real feature-flag client can be substituted without touching the
///   phase handlers or the machine
#[async_trait]
pub trait ToggleSource: Send + Sync {
    /// True while the toggle is un-set (the worker may arm for the next run)
    async fn is_unset(&self) -> bool;

    /// True while the toggle is set (the worker may start the job)
    async fn is_set(&self) -> bool;
}

/// Production stand-in: the toggle is un-set on even wall-clock minutes
/// and set on odd ones.
pub struct MinuteParityToggle {
    time_provider: Arc<dyn TimeProvider>,
}

impl MinuteParityToggle {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

#[async_trait]
impl ToggleSource for MinuteParityToggle {
    async fn is_unset(&self) -> bool {
        self.time_provider.minute_of_hour() % 2 == 0
    }

    async fn is_set(&self) -> bool {
        self.time_provider.minute_of_hour() % 2 == 1
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Mock toggle with independently settable predicates and a query counter
    pub struct MockToggle {
        unset: AtomicBool,
        set: AtomicBool,
        queries: AtomicUsize,
    }

    impl MockToggle {
        pub fn new(unset: bool, set: bool) -> Self {
            Self {
                unset: AtomicBool::new(unset),
                set: AtomicBool::new(set),
                queries: AtomicUsize::new(0),
            }
        }

        /// Both predicates answer true (every poll advances immediately)
        pub fn new_open() -> Self {
            Self::new(true, true)
        }

        /// Both predicates answer false (polling never advances)
        pub fn new_closed() -> Self {
            Self::new(false, false)
        }

        pub fn set_unset(&self, value: bool) {
            self.unset.store(value, Ordering::SeqCst);
        }

        pub fn set_set(&self, value: bool) {
            self.set.store(value, Ordering::SeqCst);
        }

        /// Total number of predicate evaluations
        pub fn query_count(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToggleSource for MockToggle {
        async fn is_unset(&self) -> bool {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.unset.load(Ordering::SeqCst)
        }

        async fn is_set(&self) -> bool {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.set.load(Ordering::SeqCst)
        }
    }
}
