// Phase Machine - current phase plus the explicit transition table

use crate::domain::{DomainError, Phase, Trigger};
use std::collections::HashMap;
use tracing::debug;

/// Owns the current phase and the (phase, trigger) -> phase edge map.
///
/// Edges are registered up front with [`permit`](Self::permit) and never
/// change afterwards. `fire` takes `&mut self`, so transition
/// serialization is enforced by ownership: whoever holds the machine is
/// the only party that can move it.
pub struct PhaseMachine {
    current: Phase,
    table: HashMap<(Phase, Trigger), Phase>,
}

impl PhaseMachine {
    /// Create a machine parked in `initial` with an empty edge map
    pub fn new(initial: Phase) -> Self {
        Self {
            current: initial,
            table: HashMap::new(),
        }
    }

    /// Current phase
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Register an outgoing edge. Each (phase, trigger) pair may be
    /// registered at most once.
    pub fn permit(
        &mut self,
        from: Phase,
        trigger: Trigger,
        to: Phase,
    ) -> Result<(), DomainError> {
        if self.table.contains_key(&(from, trigger)) {
            return Err(DomainError::DuplicateEdge {
                phase: from,
                trigger,
            });
        }
        self.table.insert((from, trigger), to);
        Ok(())
    }

    /// True if `trigger` is permitted from the current phase
    pub fn can_fire(&self, trigger: Trigger) -> bool {
        self.table.contains_key(&(self.current, trigger))
    }

    /// Fire a trigger against the current phase.
    ///
    /// On success the current phase is updated and the new phase is
    /// returned. If the edge map has no entry for (current, trigger) the
    /// machine reports `InvalidTransition` and the phase is left
    /// unchanged.
    pub fn fire(&mut self, trigger: Trigger) -> Result<Phase, DomainError> {
        let next = *self
            .table
            .get(&(self.current, trigger))
            .ok_or(DomainError::InvalidTransition {
                phase: self.current,
                trigger,
            })?;

        debug!(from = %self.current, %trigger, to = %next, "Transition applied");
        self.current = next;
        Ok(next)
    }
}
