//! API error types
//!
//! Record errors pass through with their own codes; the API layer only adds
//! codes for requests it cannot parse or dispatch.

use std::fmt;

use crate::records::RecordError;

/// API-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Malformed request envelope
    InvalidRequest,
    /// `op` names no known operation
    UnknownOperation,
    /// Response data could not be serialized
    Internal,
}

impl ApiErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidRequest => "MEDVAULT_INVALID_REQUEST",
            ApiErrorCode::UnknownOperation => "MEDVAULT_UNKNOWN_OPERATION",
            ApiErrorCode::Internal => "MEDVAULT_INTERNAL",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error carrying a wire code and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: String,
    message: String,
}

impl ApiError {
    fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code().to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidRequest, reason)
    }

    /// Create an unknown operation error
    pub fn unknown_operation(op: &str) -> Self {
        Self::new(
            ApiErrorCode::UnknownOperation,
            format!("Unknown operation: {}", op),
        )
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, reason)
    }

    /// Returns the error code string
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
