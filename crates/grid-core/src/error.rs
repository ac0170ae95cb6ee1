//! Controller error type

use crate::config::ConfigError;
use grid_reconcile::ReconcileError;
use grid_store::StoreError;
use grid_view::ViewError;

/// Table controller error
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GridError {
    /// Check if the caller may retry the same operation
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) | Self::Reconcile(ReconcileError::Store(e)) => e.is_retryable(),
            _ => false,
        }
    }

    /// Check if error comes from invalid input or misuse rather than the store
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::View(ViewError::Validation(_)) => true,
            Self::Reconcile(e) => e.is_user_error(),
            _ => false,
        }
    }

    /// Message suitable for a toast
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Store(e) | Self::Reconcile(ReconcileError::Store(e)) => e.message(),
            other => other.to_string(),
        }
    }
}
