//! Time-ordered schedule.

use crate::error::CommandError;
use bytes::Bytes;
use chrono::NaiveDateTime;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One scheduled payload.
///
/// Ordering is by `(due, seq)`: the sequence number is assigned at insertion,
/// so entries sharing a due-timestamp drain in insertion order. The payload
/// never participates in the comparison.
#[derive(Debug, Clone)]
struct Entry {
    due: NaiveDateTime,
    seq: u64,
    payload: Bytes,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

/// Priority collection of `(due-timestamp, payload)` pairs, earliest first.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a payload due at `due`.
    pub fn add(&mut self, due: NaiveDateTime, payload: Bytes) -> i64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { due, seq, payload }));
        1
    }

    /// Removes and returns every payload due at or before `cutoff`, in
    /// non-decreasing `(due, insertion)` order. Later entries are untouched.
    pub fn read_due(&mut self, cutoff: NaiveDateTime) -> Vec<Bytes> {
        let mut due = Vec::new();
        while self.heap.peek().map_or(false, |top| top.0.due <= cutoff) {
            if let Some(Reverse(entry)) = self.heap.pop() {
                due.push(entry.payload);
            }
        }
        due
    }

    /// Empties the schedule, returning the prior entry count.
    pub fn clear(&mut self) -> i64 {
        let len = self.heap.len() as i64;
        self.heap.clear();
        len
    }

    pub fn len(&self) -> i64 {
        self.heap.len() as i64
    }
}

/// Parses a schedule timestamp: `YYYY-MM-DD HH:MM:SS` with optional
/// fractional seconds.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, CommandError> {
    let format = if text.contains('.') {
        "%Y-%m-%d %H:%M:%S%.f"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    NaiveDateTime::parse_from_str(text, format).map_err(|_| CommandError::InvalidTimestamp)
}
