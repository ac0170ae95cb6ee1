//! Error types for record stores

use crate::record::RecordId;

/// Record store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backing call rejected (network, auth, server)
    #[error("transport error: {0}")]
    Transport(String),

    /// One or more updates in a batch failed
    #[error("batch update failed for record {record_id}: {message} ({failed} failed)")]
    BatchUpdate {
        /// First failing record in submission order
        record_id: RecordId,
        /// Message of the first failure
        message: String,
        /// Number of failed updates in the batch
        failed: usize,
    },

    /// Store call exceeded its time budget
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// Store operation name
        operation: &'static str,
        /// Configured budget
        millis: u64,
    },

    /// Record does not exist
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Store refused the request (e.g. required field missing)
    #[error("rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Check if the failure is worth retrying by the caller
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::BatchUpdate { .. }
        )
    }

    /// Human-readable message without the variant prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Transport(msg) | Self::Rejected(msg) => msg.clone(),
            Self::BatchUpdate { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
