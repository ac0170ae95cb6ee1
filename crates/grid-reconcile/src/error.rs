//! Error types for the reconciler

use crate::state::ReconcilerState;
use grid_store::StoreError;

/// Reconciler error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Operation invoked in the wrong state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// Rejected operation
        operation: &'static str,
        /// State at the time of the call
        state: ReconcilerState,
    },

    /// Edit targets a field that cannot be written
    #[error("field {0} is read-only")]
    ReadOnlyField(String),

    /// Backing store rejected the submission
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Check if error is a state violation
    #[inline]
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if error comes from the caller's input
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidState { .. } | Self::ReadOnlyField(_))
    }
}
