// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Current wall-clock minute of the hour (0-59)
    fn minute_of_hour(&self) -> u32 {
        ((self.now_millis() / 60_000) % 60) as u32
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Fixed clock for deterministic tests
    pub struct FixedTimeProvider {
        millis: i64,
    }

    impl FixedTimeProvider {
        pub fn new(millis: i64) -> Self {
            Self { millis }
        }

        /// Clock frozen at the given minute of the hour
        pub fn at_minute(minute: u32) -> Self {
            Self {
                millis: i64::from(minute) * 60_000,
            }
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.millis
        }
    }
}
