//! Server error types.

use thiserror::Error;

/// Errors that end a connection or prevent the server from running.
///
/// Command-level failures never appear here; they are reported to the client
/// as Error values and the connection continues.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] taskq_protocol::ProtocolError),
}
