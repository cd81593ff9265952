// Port Layer - Interfaces for external dependencies

pub mod job_runner;
pub mod time_provider; // For deterministic testing
pub mod toggle_source;

// Re-exports
pub use job_runner::{FixedDelayJob, JobError, JobRunner};
pub use time_provider::TimeProvider;
pub use toggle_source::{MinuteParityToggle, ToggleSource};
