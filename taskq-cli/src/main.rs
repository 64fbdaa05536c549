//! taskq-cli - Command-line interface for taskq
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::net::SocketAddr;
use taskq_client::{Client, ConnectionConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskq-cli")]
#[command(about = "Command-line interface for the taskq broker")]
#[command(version)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:31337")]
    server: SocketAddr,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive REPL
    Repl,

    /// Push a value onto the tail of a queue
    Enqueue { queue: String, data: String },

    /// Pop the head of a queue
    Dequeue { queue: String },

    /// Remove the first matching value from a queue
    Remove { queue: String, data: String },

    /// Report the length of a queue
    QueueLen { queue: String },

    /// Empty a queue
    FlushQueue { queue: String },

    /// Store a value under a key
    Set { key: String, value: String },

    /// Store a value only if the key is absent
    Setnx { key: String, value: String },

    /// Fetch the value for a key
    Get { key: String },

    /// Fetch and remove the value for a key
    Pop { key: String },

    /// Delete a key
    Delete { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// Report the number of stored keys
    KvLen,

    /// Empty the key/value store
    FlushKv,

    /// Schedule a payload for later execution
    Add { timestamp: String, data: String },

    /// Read every payload due at or before the timestamp
    Read { timestamp: String },

    /// Report the number of scheduled payloads
    ScheduleLen,

    /// Empty the schedule
    FlushSchedule,

    /// Clear queues, key/value store, and schedule
    Flushall,

    /// Ask the server to terminate
    Shutdown,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = ConnectionConfig::new(cli.server);
    let client = match Client::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}: {}", "Connection failed".red(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(client, cli.server).await?;
        }
        Some(cmd) => match commands::execute(&client, cmd).await {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
