// Domain Layer - Phase cycle model

pub mod error;
pub mod phase;

pub use error::DomainError;
pub use phase::{Phase, Trigger};
