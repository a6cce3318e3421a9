//! Storage Integrity Tests
//!
//! The record log is append-only and checksum-verified. A damaged frame
//! always fails the read; it is never skipped.

use medvault::storage::{
    log_path, FileMap, LogEntry, MapBackend, Severity, SlotLimits, StorageErrorCode,
    StorageReader, StorageWriter,
};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn open_map(data_dir: &std::path::Path) -> FileMap {
    FileMap::open(data_dir, SlotLimits::default()).unwrap()
}

// =============================================================================
// Corruption Is Never Ignored
// =============================================================================

/// A flipped byte in the middle of a frame fails the open.
#[test]
fn test_corruption_causes_explicit_failure() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut map = open_map(data_dir);
        map.insert("rec1", b"{\"title\":\"X-ray\"}".to_vec()).unwrap();
    }

    let path = log_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = FileMap::open(data_dir, SlotLimits::default())
        .err()
        .expect("corrupt log must not open");
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
    assert_eq!(err.severity(), Severity::Fatal);
    assert!(err.is_fatal());
}

/// Damage to the trailing checksum bytes is detected too.
#[test]
fn test_corrupted_checksum_bytes_detected() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        writer.append(&LogEntry::put("rec1", b"v".to_vec())).unwrap();
    }

    let path = log_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0x01;
    fs::write(&path, contents).unwrap();

    let mut reader = StorageReader::open(&path).unwrap();
    let err = reader.read_next().unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
}

/// The error names the offset of the damaged frame.
#[test]
fn test_corruption_reports_frame_offset() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    let second_offset = {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        writer.append(&LogEntry::put("a", b"1".to_vec())).unwrap();
        writer.append(&LogEntry::put("b", b"2".to_vec())).unwrap()
    };

    let path = log_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let mut reader = StorageReader::open(&path).unwrap();
    assert!(reader.read_next().unwrap().is_some());

    let err = reader.read_next().unwrap_err();
    let expected = format!("byte_offset: {}", second_offset);
    assert_eq!(err.details(), Some(expected.as_str()));
}

/// A partially written final frame is reported, not dropped.
#[test]
fn test_truncated_frame_detected() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut map = open_map(data_dir);
        map.insert("rec1", b"value".to_vec()).unwrap();
    }

    let path = log_path(data_dir);
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 3]).unwrap();

    assert!(FileMap::open(data_dir, SlotLimits::default()).is_err());
}

// =============================================================================
// Append-Only Log
// =============================================================================

/// Every write appends; earlier versions stay in the log until compaction.
#[test]
fn test_append_only_preserves_all_versions() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut map = open_map(data_dir);
        map.insert("rec1", b"v1".to_vec()).unwrap();
        map.insert("rec1", b"v2".to_vec()).unwrap();
        map.remove("rec1").unwrap();
    }

    let mut reader = StorageReader::open(&log_path(data_dir)).unwrap();
    let entries = reader.read_all().unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], LogEntry::put("rec1", b"v1".to_vec()));
    assert_eq!(entries[1], LogEntry::put("rec1", b"v2".to_vec()));
    assert!(entries[2].is_tombstone);
}

/// Writer offsets match the file length after each append.
#[test]
fn test_offset_tracking() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    let mut writer = StorageWriter::open(data_dir).unwrap();
    assert_eq!(writer.current_offset(), 0);

    let first = writer.append(&LogEntry::put("a", b"1".to_vec())).unwrap();
    let second = writer.append(&LogEntry::put("b", b"22".to_vec())).unwrap();

    assert_eq!(first, 0);
    assert!(second > first);
    assert_eq!(
        writer.current_offset(),
        fs::metadata(log_path(data_dir)).unwrap().len()
    );
}

/// A reopened writer continues at the end of the existing log.
#[test]
fn test_writer_reopens_with_correct_state() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    let end = {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        writer.append(&LogEntry::put("a", b"1".to_vec())).unwrap();
        writer.current_offset()
    };

    let mut writer = StorageWriter::open(data_dir).unwrap();
    assert_eq!(writer.current_offset(), end);
    assert_eq!(
        writer.append(&LogEntry::put("b", b"2".to_vec())).unwrap(),
        end
    );
}

// =============================================================================
// Durability
// =============================================================================

/// Inserts and removals are visible after reopening.
#[test]
fn test_data_persists_across_reopens() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut map = open_map(data_dir);
        map.insert("keep", b"kept".to_vec()).unwrap();
        map.insert("drop", b"dropped".to_vec()).unwrap();
        map.remove("drop").unwrap();
    }

    let map = open_map(data_dir);
    assert_eq!(map.get("keep").unwrap(), Some(b"kept".to_vec()));
    assert_eq!(map.get("drop").unwrap(), None);
    assert_eq!(map.len(), 1);
}

/// Oversized writes are refused and leave nothing on disk.
#[test]
fn test_limits_checked_before_write() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    let mut map = FileMap::open(data_dir, SlotLimits::new(8, 16)).unwrap();
    let err = map.insert("k", vec![0u8; 17]).unwrap_err();

    assert_eq!(err.code(), StorageErrorCode::LimitExceeded);
    assert_eq!(fs::metadata(log_path(data_dir)).unwrap().len(), 0);
}

/// Compaction shrinks the log without changing what a reopen sees.
#[test]
fn test_compaction_preserves_live_values() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut map = open_map(data_dir);
        for i in 0..5 {
            map.insert("hot", format!("v{}", i).into_bytes()).unwrap();
        }
        map.insert("cold", b"c".to_vec()).unwrap();
        map.insert("gone", b"g".to_vec()).unwrap();
        map.remove("gone").unwrap();

        let stats = map.compact().unwrap();
        assert!(stats.bytes_after < stats.bytes_before);
        assert_eq!(stats.live_entries, 2);

        map.insert("after", b"a".to_vec()).unwrap();
    }

    let map = open_map(data_dir);
    assert_eq!(map.get("hot").unwrap(), Some(b"v4".to_vec()));
    assert_eq!(map.get("cold").unwrap(), Some(b"c".to_vec()));
    assert_eq!(map.get("after").unwrap(), Some(b"a".to_vec()));
    assert_eq!(map.get("gone").unwrap(), None);
}
