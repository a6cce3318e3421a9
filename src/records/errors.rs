//! # Record Errors
//!
//! Every record operation resolves to one of three failure kinds.

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Owner-gated action named in a [`RecordError::Forbidden`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => write!(f, "read"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Record store errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// No record exists under the id
    #[error("The Record with id={id} was not found")]
    NotFound { id: String },

    /// The record exists but belongs to someone else
    #[error("Only the creator can {action} the Record")]
    Forbidden { action: Action },

    /// The backend failed underneath the named operation
    #[error("Failed to {operation}: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: StorageError,
    },
}

impl RecordError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub(crate) fn backend(operation: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Backend { operation, source }
    }

    /// Stable error code for wire responses
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::NotFound { .. } => "MEDVAULT_RECORD_NOT_FOUND",
            RecordError::Forbidden { .. } => "MEDVAULT_FORBIDDEN",
            RecordError::Backend { .. } => "MEDVAULT_BACKEND_FAILURE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, RecordError::Forbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RecordError::not_found("abc").to_string(),
            "The Record with id=abc was not found"
        );
        assert_eq!(
            RecordError::Forbidden { action: Action::Delete }.to_string(),
            "Only the creator can delete the Record"
        );
    }

    #[test]
    fn test_backend_message_names_operation() {
        let err = RecordError::backend("add the record")(StorageError::limit_exceeded(
            "value", 2000, 1024,
        ));
        let message = err.to_string();
        assert!(message.starts_with("Failed to add the record: "));
        assert!(message.contains("MEDVAULT_STORAGE_LIMIT_EXCEEDED"));
        assert_eq!(err.code(), "MEDVAULT_BACKEND_FAILURE");
    }

    #[test]
    fn test_codes() {
        assert_eq!(RecordError::not_found("x").code(), "MEDVAULT_RECORD_NOT_FOUND");
        assert_eq!(
            RecordError::Forbidden { action: Action::Read }.code(),
            "MEDVAULT_FORBIDDEN"
        );
    }
}
