//! Opaque key/value storage.

use bytes::Bytes;
use std::collections::HashMap;

/// Single flat mapping of opaque keys to opaque values.
///
/// Exactly one value per key at any time; writing overwrites.
#[derive(Debug, Default)]
pub struct KvStore {
    entries: HashMap<Vec<u8>, Bytes>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite.
    pub fn set(&mut self, key: &[u8], value: Bytes) -> i64 {
        self.entries.insert(key.to_vec(), value);
        1
    }

    /// Writes only when the key is absent; 1 when written, 0 when left alone.
    pub fn set_nx(&mut self, key: &[u8], value: Bytes) -> i64 {
        if self.entries.contains_key(key) {
            0
        } else {
            self.entries.insert(key.to_vec(), value);
            1
        }
    }

    /// Non-destructive lookup.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    /// Destructive lookup: the entry is removed on a hit.
    pub fn pop(&mut self, key: &[u8]) -> Option<Bytes> {
        self.entries.remove(key)
    }

    /// Removes the key; 1 if it was present, 0 otherwise.
    pub fn delete(&mut self, key: &[u8]) -> i64 {
        if self.entries.remove(key).is_some() {
            1
        } else {
            0
        }
    }

    pub fn exists(&self, key: &[u8]) -> i64 {
        if self.entries.contains_key(key) {
            1
        } else {
            0
        }
    }

    /// Empties the store, returning the prior entry count.
    pub fn clear(&mut self) -> i64 {
        let len = self.entries.len() as i64;
        self.entries.clear();
        len
    }

    pub fn len(&self) -> i64 {
        self.entries.len() as i64
    }
}
