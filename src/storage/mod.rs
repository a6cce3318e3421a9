//! Durable key-value storage for medvault
//!
//! The storage engine holds the persistent state of every record as an
//! append-only log of checksummed frames. [`FileMap`] replays the log into an
//! ordered in-memory view and exposes it through [`MapBackend`].
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates)
//! - Checksum-verified on every read
//! - Latest frame wins for the same key
//! - Removals are tombstone frames, invisible above this module
//! - Fixed key/value slot sizes

mod backend;
mod checksum;
mod entry;
mod errors;
mod file_map;
mod reader;
mod writer;

pub use backend::{
    MapBackend, MemoryMap, SlotLimits, DEFAULT_MAX_KEY_BYTES, DEFAULT_MAX_VALUE_BYTES,
};
pub use checksum::compute_checksum;
pub use entry::LogEntry;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use file_map::{CompactionStats, FileMap};
pub use reader::StorageReader;
pub use writer::{log_path, LogFile, StorageWriter, LOG_FILE_NAME};
