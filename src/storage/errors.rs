//! Storage error types
//!
//! Error codes:
//! - MEDVAULT_STORAGE_IO_ERROR (ERROR severity)
//! - MEDVAULT_STORAGE_WRITE_FAILED (ERROR severity)
//! - MEDVAULT_STORAGE_READ_FAILED (ERROR severity)
//! - MEDVAULT_STORAGE_LIMIT_EXCEEDED (ERROR severity)
//! - MEDVAULT_STORAGE_ENCODING (ERROR severity)
//! - MEDVAULT_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the store keeps serving
    Error,
    /// The backing log cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure
    IoError,
    /// Entry write failed
    WriteFailed,
    /// Entry read failed
    ReadFailed,
    /// Key or value larger than the configured slot
    LimitExceeded,
    /// Value could not be encoded or decoded
    Encoding,
    /// Checksum or framing failure in the log
    DataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "MEDVAULT_STORAGE_IO_ERROR",
            StorageErrorCode::WriteFailed => "MEDVAULT_STORAGE_WRITE_FAILED",
            StorageErrorCode::ReadFailed => "MEDVAULT_STORAGE_READ_FAILED",
            StorageErrorCode::LimitExceeded => "MEDVAULT_STORAGE_LIMIT_EXCEEDED",
            StorageErrorCode::Encoding => "MEDVAULT_STORAGE_ENCODING",
            StorageErrorCode::DataCorruption => "MEDVAULT_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::IoError, message)
        }
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::WriteFailed, message)
        }
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::ReadFailed, message)
        }
    }

    /// Key or value does not fit its slot
    pub fn limit_exceeded(what: &str, size: usize, limit: usize) -> Self {
        Self {
            details: Some(format!("size: {}, limit: {}", size, limit)),
            ..Self::new(
                StorageErrorCode::LimitExceeded,
                format!("{} exceeds the configured slot size", what),
            )
        }
    }

    /// Value encoding or decoding failed
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::Encoding, reason)
    }

    /// An earlier failed append could not be rolled back; the writer
    /// refuses further appends.
    pub fn writer_poisoned(path: &std::path::Path) -> Self {
        Self {
            details: Some(format!("path: {}", path.display())),
            ..Self::new(
                StorageErrorCode::WriteFailed,
                "Log writer disabled after a failed rollback",
            )
        }
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::new(StorageErrorCode::DataCorruption, reason)
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the log should no longer be trusted
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
