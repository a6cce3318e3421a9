//! Host failures
//!
//! Anything that stops a command before or around request handling.
//! Request-level failures never reach here; they become error responses.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Data directory {} already initialized", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("Data directory {} not initialized. Run 'medvault init' first.", .0.display())]
    NotInitialized(PathBuf),

    /// The record log could not be replayed; nothing is served.
    #[error("Record log replay failed: {0}")]
    Replay(#[source] StorageError),

    /// Compaction stopped; the previous log stays in use.
    #[error("Compaction failed: {0}")]
    Compaction(#[source] StorageError),

    #[error("Failed to install logger: {0}")]
    Logging(String),

    #[error("Empty input")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "MEDVAULT_CLI_CONFIG_ERROR",
            Self::CreateDir { .. } => "MEDVAULT_CLI_INIT_FAILED",
            Self::AlreadyInitialized(_) => "MEDVAULT_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized(_) => "MEDVAULT_CLI_NOT_INITIALIZED",
            Self::Replay(_) => "MEDVAULT_CLI_BOOT_FAILED",
            Self::Compaction(_) => "MEDVAULT_CLI_COMPACTION_FAILED",
            Self::Logging(_) => "MEDVAULT_CLI_LOGGING_FAILED",
            Self::EmptyInput | Self::Io(_) => "MEDVAULT_CLI_IO_ERROR",
        }
    }

    /// The storage failure behind this error, if any.
    pub fn storage_cause(&self) -> Option<&StorageError> {
        match self {
            Self::Replay(e) | Self::Compaction(e) => Some(e),
            _ => None,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
