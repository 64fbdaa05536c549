//! # taskq-core
//!
//! In-memory data engines for taskq:
//! - [`QueueStore`]: named FIFO queues
//! - [`KvStore`]: opaque key/value storage
//! - [`ScheduleStore`]: time-ordered schedule with insertion-order tie-break
//! - [`Broker`]: one serialized instance of each engine
//!
//! The engines are pure logic with no I/O and do not synchronize themselves;
//! the [`Broker`] guards each engine with its own mutex and is the only
//! shared mutable state in a running server.

pub mod broker;
pub mod error;
pub mod kv;
pub mod queue;
pub mod schedule;

pub use broker::Broker;
pub use error::CommandError;
pub use kv::KvStore;
pub use queue::QueueStore;
pub use schedule::{parse_timestamp, ScheduleStore};
