// Worker constants (no magic values)
use std::time::Duration;

/// Cadence between toggle evaluations in the polling phases (15s)
pub const TOGGLE_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Duration of the stand-in job executed in the Running phase (5s)
pub const JOB_DURATION: Duration = Duration::from_secs(5);
