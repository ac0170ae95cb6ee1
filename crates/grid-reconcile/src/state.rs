//! Reconciler state machine
//!
//! `Idle -> Submitting -> (Idle | Failed)`, and `Failed -> Idle` once the
//! caller has acknowledged the failure.

use serde::{Deserialize, Serialize};

/// Submission lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReconcilerState {
    /// Accepting edits
    #[default]
    Idle,
    /// One batch in flight
    Submitting,
    /// Last batch failed; awaiting acknowledgement
    Failed,
}

impl std::fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Disallowed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {from} -> {to}")]
pub struct TransitionError {
    pub from: ReconcilerState,
    pub to: ReconcilerState,
}

/// Validates a state transition.
pub fn validate_transition(
    from: ReconcilerState,
    to: ReconcilerState,
) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

pub fn allowed_transitions(from: ReconcilerState) -> Vec<ReconcilerState> {
    use ReconcilerState::*;
    match from {
        Idle => vec![Submitting],
        Submitting => vec![Idle, Failed],
        Failed => vec![Idle],
    }
}
