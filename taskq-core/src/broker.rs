//! Process-wide broker state.

use crate::error::CommandError;
use crate::kv::KvStore;
use crate::queue::QueueStore;
use crate::schedule::{parse_timestamp, ScheduleStore};
use bytes::Bytes;
use parking_lot::Mutex;

/// One instance of each engine, each behind its own serialization point.
///
/// The broker is the only shared mutable state in the process. Every
/// operation takes the owning engine's lock for its full duration, so
/// operations are atomic with respect to each other and no caller ever
/// observes a partial effect.
#[derive(Debug, Default)]
pub struct Broker {
    queues: Mutex<QueueStore>,
    kv: Mutex<KvStore>,
    schedule: Mutex<ScheduleStore>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    // Queue engine.

    pub fn queue_append(&self, name: &[u8], value: Bytes) -> i64 {
        self.queues.lock().append(name, value)
    }

    pub fn queue_pop(&self, name: &[u8]) -> Option<Bytes> {
        self.queues.lock().pop(name)
    }

    pub fn queue_remove(&self, name: &[u8], value: &[u8]) -> i64 {
        self.queues.lock().remove(name, value)
    }

    pub fn queue_flush(&self, name: &[u8]) -> i64 {
        self.queues.lock().clear(name)
    }

    pub fn queue_length(&self, name: &[u8]) -> i64 {
        self.queues.lock().len(name)
    }

    // Key/value engine.

    pub fn kv_set(&self, key: &[u8], value: Bytes) -> i64 {
        self.kv.lock().set(key, value)
    }

    pub fn kv_setnx(&self, key: &[u8], value: Bytes) -> i64 {
        self.kv.lock().set_nx(key, value)
    }

    pub fn kv_get(&self, key: &[u8]) -> Option<Bytes> {
        self.kv.lock().get(key)
    }

    pub fn kv_pop(&self, key: &[u8]) -> Option<Bytes> {
        self.kv.lock().pop(key)
    }

    pub fn kv_delete(&self, key: &[u8]) -> i64 {
        self.kv.lock().delete(key)
    }

    pub fn kv_exists(&self, key: &[u8]) -> i64 {
        self.kv.lock().exists(key)
    }

    pub fn kv_flush(&self) -> i64 {
        self.kv.lock().clear()
    }

    pub fn kv_length(&self) -> i64 {
        self.kv.lock().len()
    }

    // Schedule engine.

    pub fn schedule_add(&self, timestamp: &str, payload: Bytes) -> Result<i64, CommandError> {
        let due = parse_timestamp(timestamp)?;
        Ok(self.schedule.lock().add(due, payload))
    }

    pub fn schedule_read(&self, timestamp: &str) -> Result<Vec<Bytes>, CommandError> {
        let cutoff = parse_timestamp(timestamp)?;
        Ok(self.schedule.lock().read_due(cutoff))
    }

    pub fn schedule_flush(&self) -> i64 {
        self.schedule.lock().clear()
    }

    pub fn schedule_length(&self) -> i64 {
        self.schedule.lock().len()
    }

    /// Clears all three engines.
    pub fn flush_all(&self) -> i64 {
        self.queues.lock().clear_all();
        self.kv.lock().clear();
        self.schedule.lock().clear();
        tracing::debug!("flushed all engines");
        1
    }
}
