// Application Layer - Phase machine and worker run loop

pub mod machine;
pub mod worker;

// Re-exports
pub use machine::PhaseMachine;
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
