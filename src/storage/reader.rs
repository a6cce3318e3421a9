//! Sequential log reader with strict corruption detection
//!
//! Every frame is checksum-verified as it is read. The reader is used to
//! replay the log when a `FileMap` opens and by compaction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::entry::{LogEntry, MIN_FRAME_SIZE};
use super::errors::{StorageError, StorageResult};

/// Forward-only reader over `records.dat`.
pub struct StorageReader {
    storage_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl StorageReader {
    /// Opens the log file for reading.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        let file = File::open(storage_path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open storage file: {}", storage_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            storage_path: storage_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` if a frame was read
    /// - `Ok(None)` at end of file
    /// - `Err(MEDVAULT_DATA_CORRUPTION)` on a truncated or mismatched frame
    pub fn read_next(&mut self) -> StorageResult<Option<LogEntry>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_FRAME_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated log: {} bytes remaining, minimum frame size is {}",
                    remaining, MIN_FRAME_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read frame length: {}", e),
            )
        })?;
        let frame_length = u64::from(u32::from_le_bytes(len_buf));

        if frame_length < MIN_FRAME_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid frame length: {}", frame_length),
            ));
        }

        if frame_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Frame length {} exceeds remaining file size {}",
                    frame_length, remaining
                ),
            ));
        }

        let mut frame = vec![0u8; frame_length as usize];
        frame[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut frame[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read frame body: {}", e),
            )
        })?;

        let (entry, consumed) = LogEntry::deserialize(&frame)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;

        Ok(Some(entry))
    }

    /// Reads every remaining entry in log order.
    pub fn read_all(&mut self) -> StorageResult<Vec<LogEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read_next()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Replays the log into the latest live value per key.
    ///
    /// Later frames win; a tombstone drops the key.
    pub fn replay(&mut self) -> StorageResult<BTreeMap<String, Vec<u8>>> {
        let mut live = BTreeMap::new();
        while let Some(entry) = self.read_next()? {
            if entry.is_tombstone {
                live.remove(&entry.key);
            } else {
                live.insert(entry.key, entry.value);
            }
        }
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::super::writer::StorageWriter;
    use super::*;
    use std::fs::OpenOptions;
    use std::io::{Seek, SeekFrom, Write};
    use tempfile::TempDir;

    fn log_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("data").join("records.dat")
    }

    #[test]
    fn test_read_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        StorageWriter::open(temp_dir.path()).unwrap();

        let mut reader = StorageReader::open(&log_path(&temp_dir)).unwrap();
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_read_entries_in_order() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut writer = StorageWriter::open(temp_dir.path()).unwrap();
            writer.append(&LogEntry::put("b", b"1".to_vec())).unwrap();
            writer.append(&LogEntry::put("a", b"2".to_vec())).unwrap();
            writer.append(&LogEntry::tombstone("b")).unwrap();
        }

        let mut reader = StorageReader::open(&log_path(&temp_dir)).unwrap();
        let entries = reader.read_all().unwrap();

        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "b"]);
        assert!(entries[2].is_tombstone);
    }

    #[test]
    fn test_replay_latest_wins_and_tombstones_drop() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut writer = StorageWriter::open(temp_dir.path()).unwrap();
            writer.append(&LogEntry::put("a", b"first".to_vec())).unwrap();
            writer.append(&LogEntry::put("b", b"keep".to_vec())).unwrap();
            writer.append(&LogEntry::put("a", b"second".to_vec())).unwrap();
            writer.append(&LogEntry::put("c", b"gone".to_vec())).unwrap();
            writer.append(&LogEntry::tombstone("c")).unwrap();
        }

        let mut reader = StorageReader::open(&log_path(&temp_dir)).unwrap();
        let live = reader.replay().unwrap();

        assert_eq!(live.len(), 2);
        assert_eq!(live["a"], b"second");
        assert_eq!(live["b"], b"keep");
    }

    #[test]
    fn test_corruption_detected() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut writer = StorageWriter::open(temp_dir.path()).unwrap();
            writer.append(&LogEntry::put("doc1", b"payload".to_vec())).unwrap();
        }

        {
            let mut file = OpenOptions::new().write(true).open(log_path(&temp_dir)).unwrap();
            file.seek(SeekFrom::Start(10)).unwrap();
            file.write_all(&[0xFF]).unwrap();
        }

        let mut reader = StorageReader::open(&log_path(&temp_dir)).unwrap();
        let err = reader.read_next().unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "MEDVAULT_DATA_CORRUPTION");
        assert_eq!(err.details(), Some("byte_offset: 0"));
    }

    #[test]
    fn test_truncated_tail_detected() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut writer = StorageWriter::open(temp_dir.path()).unwrap();
            writer.append(&LogEntry::put("doc1", b"payload".to_vec())).unwrap();
        }

        let path = log_path(&temp_dir);
        let len = std::fs::metadata(&path).unwrap().len();
        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(len - 3)
            .unwrap();

        let mut reader = StorageReader::open(&path).unwrap();
        assert!(reader.read_next().unwrap_err().is_fatal());
    }
}
