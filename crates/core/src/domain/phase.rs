// Phase Cycle Domain Model

/// Operational phase of the worker. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Startup,
    WaitingForReset,
    WaitingToRun,
    Running,
}

/// Named request to transition between phases.
///
/// Each trigger is permitted from exactly one source phase; the edge map
/// in [`crate::application::machine::PhaseMachine`] enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Start,
    Reset,
    Set,
    JobFinished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Startup => write!(f, "STARTUP"),
            Phase::WaitingForReset => write!(f, "WAITING_FOR_RESET"),
            Phase::WaitingToRun => write!(f, "WAITING_TO_RUN"),
            Phase::Running => write!(f, "RUNNING"),
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Start => write!(f, "START"),
            Trigger::Reset => write!(f, "RESET"),
            Trigger::Set => write!(f, "SET"),
            Trigger::JobFinished => write!(f, "JOB_FINISHED"),
        }
    }
}
