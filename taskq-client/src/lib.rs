//! # taskq-client
//!
//! Async client library for taskq.
//!
//! [`Client`] wraps a single connection and exposes the broker's command
//! surface behind descriptive method names: queue operations for work,
//! data operations for results, schedule operations for deferred work.

pub mod client;
pub mod connection;
pub mod error;

pub use client::Client;
pub use connection::{Connection, ConnectionConfig};
pub use error::ClientError;
