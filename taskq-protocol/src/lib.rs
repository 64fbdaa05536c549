//! # taskq-protocol
//!
//! Wire protocol implementation for taskq.
//!
//! This crate provides:
//! - The [`Value`] model shared by requests and replies
//! - Length-prefixed framing in the Redis serialization style
//! - A streaming [`Decoder`] that consumes exactly one complete value at a time
//! - Protocol error types and constants

pub mod codec;
pub mod error;
pub mod value;

pub use codec::Decoder;
pub use error::ProtocolError;
pub use value::Value;

/// Default port for the taskq server.
pub const DEFAULT_PORT: u16 = 31337;

/// Maximum bulk string payload size (16 MiB).
pub const MAX_BULK_SIZE: usize = 16 * 1024 * 1024;

/// Maximum number of elements in a single array.
pub const MAX_ARRAY_LEN: usize = 65_536;

/// Maximum length of a CRLF-terminated line (type tags, length prefixes,
/// simple strings, error messages).
pub const MAX_LINE_LEN: usize = 8 * 1024;
