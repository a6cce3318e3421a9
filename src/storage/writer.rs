//! Append-only log writer with fsync enforcement
//!
//! An entry is not acknowledged until its frame has been written and synced.
//! Frames are only appended. The one exception is cutting a failed append
//! back off the tail; compaction writes a fresh file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use super::entry::LogEntry;
use super::errors::{StorageError, StorageResult};

/// File name of the record log inside `<data_dir>/data`.
pub const LOG_FILE_NAME: &str = "records.dat";

/// Returns the log path for a data directory.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(LOG_FILE_NAME)
}

/// File operations the writer relies on beyond `Write`.
pub trait LogFile: Write {
    /// Flush written bytes to stable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the file back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writer that appends frames to `records.dat`.
///
/// A failed append is rolled back to the previous end of the log. If the
/// rollback itself fails the writer is poisoned and refuses every later
/// append, so no acknowledged frame can land behind a torn one.
pub struct StorageWriter<F = File> {
    storage_path: PathBuf,
    file: F,
    current_offset: u64,
    poisoned: bool,
}

impl StorageWriter {
    /// Opens or creates the log at `<data_dir>/data/records.dat`.
    ///
    /// Creates parent directories if needed.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        Self::open_path(&log_path(data_dir))
    }

    /// Opens or creates a log at an explicit path.
    pub fn open_path(storage_path: &Path) -> StorageResult<Self> {
        if let Some(parent) = storage_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::write_failed(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(storage_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open storage file: {}", storage_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self::from_parts(storage_path, file, current_offset))
    }
}

impl<F: LogFile> StorageWriter<F> {
    pub(crate) fn from_parts(storage_path: &Path, file: F, current_offset: u64) -> Self {
        Self {
            storage_path: storage_path.to_path_buf(),
            file,
            current_offset,
            poisoned: false,
        }
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Returns the current end-of-log offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Records that the open file now lives at `path` after a rename.
    pub(crate) fn moved_to(mut self, path: &Path) -> Self {
        self.storage_path = path.to_path_buf();
        self
    }

    /// Appends an entry and syncs it to disk.
    ///
    /// Returns the byte offset the frame was written at. On failure the log
    /// is left exactly as it was before the call.
    pub fn append(&mut self, entry: &LogEntry) -> StorageResult<u64> {
        if self.poisoned {
            return Err(StorageError::writer_poisoned(&self.storage_path));
        }

        let frame = entry.serialize();
        let offset = self.current_offset;

        let written = self
            .file
            .write_all(&frame)
            .map_err(|e| {
                StorageError::write_failed(format!("Failed to write entry: {}", entry.key), e)
            })
            .and_then(|()| {
                self.file.sync().map_err(|e| {
                    StorageError::write_failed(
                        format!("fsync failed after writing entry: {}", entry.key),
                        e,
                    )
                })
            });

        if let Err(err) = written {
            self.roll_back(offset);
            return Err(err);
        }

        self.current_offset += frame.len() as u64;

        Ok(offset)
    }

    fn roll_back(&mut self, offset: u64) {
        match self.file.truncate(offset).and_then(|()| self.file.sync()) {
            Ok(()) => warn!(
                path = %self.storage_path.display(),
                offset,
                "failed append rolled back"
            ),
            Err(e) => {
                self.poisoned = true;
                error!(
                    path = %self.storage_path.display(),
                    offset,
                    error = %e,
                    "failed append could not be rolled back; writer disabled"
                );
            }
        }
    }
}
