//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] taskq_protocol::ProtocolError),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("connection closed")]
    ConnectionClosed,

    /// The server answered with an Error value.
    #[error("command failed: {0}")]
    Command(String),

    /// The server answered with a value shape the operation does not expect.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}
