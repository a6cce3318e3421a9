//! Durable map backend interface
//!
//! The record store only ever talks to storage through [`MapBackend`]:
//! point lookups, overwriting inserts, removals and a full value scan.
//! Keys iterate in ascending order for every implementation here.

use std::collections::BTreeMap;

use super::errors::{StorageError, StorageResult};

/// Default key slot, matching the 30-character record ids with headroom.
pub const DEFAULT_MAX_KEY_BYTES: usize = 44;

/// Default value slot for one serialized record.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 1024;

/// Fixed-size slot budget enforced by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLimits {
    pub max_key_bytes: usize,
    pub max_value_bytes: usize,
}

impl SlotLimits {
    pub fn new(max_key_bytes: usize, max_value_bytes: usize) -> Self {
        Self {
            max_key_bytes,
            max_value_bytes,
        }
    }

    /// Rejects keys or values that do not fit their slot.
    pub fn check(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        if key.len() > self.max_key_bytes {
            return Err(StorageError::limit_exceeded("key", key.len(), self.max_key_bytes));
        }
        if value.len() > self.max_value_bytes {
            return Err(StorageError::limit_exceeded(
                "value",
                value.len(),
                self.max_value_bytes,
            ));
        }
        Ok(())
    }
}

impl Default for SlotLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_KEY_BYTES, DEFAULT_MAX_VALUE_BYTES)
    }
}

/// Persistent, ordered key-value map.
pub trait MapBackend {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, returning the value it replaced.
    fn insert(&mut self, key: &str, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>>;

    /// Removes `key`, returning the value it held.
    fn remove(&mut self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Returns every stored value in key order.
    fn values(&self) -> StorageResult<Vec<Vec<u8>>>;
}

impl<B: MapBackend + ?Sized> MapBackend for Box<B> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn insert(&mut self, key: &str, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>> {
        (**self).insert(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).remove(key)
    }

    fn values(&self) -> StorageResult<Vec<Vec<u8>>> {
        (**self).values()
    }
}

/// In-process backend; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryMap {
    entries: BTreeMap<String, Vec<u8>>,
    limits: SlotLimits,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SlotLimits) -> Self {
        Self {
            entries: BTreeMap::new(),
            limits,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MapBackend for MemoryMap {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn insert(&mut self, key: &str, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>> {
        self.limits.check(key, &value)?;
        Ok(self.entries.insert(key.to_string(), value))
    }

    fn remove(&mut self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.remove(key))
    }

    fn values(&self) -> StorageResult<Vec<Vec<u8>>> {
        Ok(self.entries.values().cloned().collect())
    }
}
