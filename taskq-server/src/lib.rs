//! # taskq-server
//!
//! TCP server for taskq: configuration, command dispatch, per-connection
//! request loops, bounded admission, and coordinated shutdown.

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{Config, ConfigError, NetworkConfig};
pub use error::ServerError;
pub use handler::{Command, CommandHandler, Outcome};
pub use server::{Server, ServerConfig, ServerStats};
