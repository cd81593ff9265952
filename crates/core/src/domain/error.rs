// Domain Error Types

use crate::domain::{Phase, Trigger};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("No transition from {phase} on trigger {trigger}")]
    InvalidTransition { phase: Phase, trigger: Trigger },

    #[error("Duplicate edge from {phase} on trigger {trigger}")]
    DuplicateEdge { phase: Phase, trigger: Trigger },
}

pub type Result<T> = std::result::Result<T, DomainError>;
