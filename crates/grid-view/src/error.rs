//! Error types for the filtered view

/// View error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// Malformed filter, sort, paging or record input
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ViewError {
    /// Create validation error
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
