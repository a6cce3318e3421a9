//! Log-backed durable map
//!
//! `FileMap` keeps the latest live value of every key in memory and makes
//! each mutation durable by appending a frame to `records.dat` before the
//! in-memory view changes. Opening the map replays the whole log.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::backend::{MapBackend, SlotLimits};
use super::entry::LogEntry;
use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::writer::StorageWriter;

/// Durable [`MapBackend`] over an append-only checksummed log.
pub struct FileMap {
    writer: StorageWriter,
    live: BTreeMap<String, Vec<u8>>,
    limits: SlotLimits,
}

/// Outcome of a [`FileMap::compact`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub live_entries: usize,
}

impl FileMap {
    /// Opens the map stored under `data_dir`, replaying its log.
    ///
    /// A corrupt frame anywhere in the log fails the open.
    pub fn open(data_dir: &Path, limits: SlotLimits) -> StorageResult<Self> {
        let writer = StorageWriter::open(data_dir)?;
        let live = StorageReader::open(writer.path())?.replay()?;

        debug!(
            path = %writer.path().display(),
            live_entries = live.len(),
            log_bytes = writer.current_offset(),
            "record log replayed"
        );

        Ok(Self {
            writer,
            live,
            limits,
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Rewrites the log so it holds exactly one frame per live key.
    ///
    /// The new log is written beside the old one and renamed over it. If
    /// any step fails the map keeps appending to the old log.
    pub fn compact(&mut self) -> StorageResult<CompactionStats> {
        let bytes_before = self.writer.current_offset();
        let target = self.writer.path().to_path_buf();
        let staging = staging_path(&target);

        if staging.exists() {
            fs::remove_file(&staging).map_err(|e| {
                StorageError::io_error(
                    format!("Failed to clear stale compaction file: {}", staging.display()),
                    e,
                )
            })?;
        }

        let mut staged = StorageWriter::open_path(&staging)?;
        for (key, value) in &self.live {
            staged.append(&LogEntry::put(key.as_str(), value.clone()))?;
        }

        fs::rename(&staging, &target).map_err(|e| {
            StorageError::io_error(
                format!("Failed to replace log with compacted copy: {}", target.display()),
                e,
            )
        })?;

        // The staged handle now refers to the renamed file.
        self.writer = staged.moved_to(&target);

        let stats = CompactionStats {
            bytes_before,
            bytes_after: self.writer.current_offset(),
            live_entries: self.live.len(),
        };
        info!(
            bytes_before = stats.bytes_before,
            bytes_after = stats.bytes_after,
            live_entries = stats.live_entries,
            "record log compacted"
        );
        Ok(stats)
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".compact");
    PathBuf::from(name)
}

impl MapBackend for FileMap {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.live.get(key).cloned())
    }

    fn insert(&mut self, key: &str, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>> {
        self.limits.check(key, &value)?;
        self.writer.append(&LogEntry::put(key, value.clone()))?;
        Ok(self.live.insert(key.to_string(), value))
    }

    fn remove(&mut self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if !self.live.contains_key(key) {
            return Ok(None);
        }
        self.writer.append(&LogEntry::tombstone(key))?;
        Ok(self.live.remove(key))
    }

    fn values(&self) -> StorageResult<Vec<Vec<u8>>> {
        Ok(self.live.values().cloned().collect())
    }
}
