//! One-shot command execution.

use crate::Commands;
use colored::Colorize;
use taskq_client::{Client, ClientError};

/// Executes one subcommand and renders its reply for the terminal.
pub async fn execute(client: &Client, command: Commands) -> Result<String, ClientError> {
    match command {
        Commands::Repl => unreachable!("handled in main"),

        Commands::Enqueue { queue, data } => {
            let n = client.enqueue(queue.into_bytes(), data.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::Dequeue { queue } => Ok(match client.dequeue(queue.into_bytes()).await? {
            Some(data) => display_bytes(&data),
            None => nil(),
        }),

        Commands::Remove { queue, data } => {
            let n = client.unqueue(queue.into_bytes(), data.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::QueueLen { queue } => {
            let n = client.queue_size(queue.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::FlushQueue { queue } => {
            let n = client.flush_queue(queue.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::Set { key, value } => {
            let n = client.put_data(key.into_bytes(), value.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::Setnx { key, value } => {
            let n = client
                .put_if_empty(key.into_bytes(), value.into_bytes())
                .await?;
            Ok(n.to_string())
        }

        Commands::Get { key } => Ok(match client.peek_data(key.into_bytes()).await? {
            Some(data) => display_bytes(&data),
            None => nil(),
        }),

        Commands::Pop { key } => Ok(match client.pop_data(key.into_bytes()).await? {
            Some(data) => display_bytes(&data),
            None => nil(),
        }),

        Commands::Delete { key } => {
            let n = client.delete_data(key.into_bytes()).await?;
            Ok(n.to_string())
        }

        Commands::Exists { key } => {
            let present = client.has_data_for_key(key.into_bytes()).await?;
            Ok(if present { "1" } else { "0" }.to_string())
        }

        Commands::KvLen => {
            let n = client.result_store_size().await?;
            Ok(n.to_string())
        }

        Commands::FlushKv => {
            let n = client.flush_results().await?;
            Ok(n.to_string())
        }

        Commands::Add { timestamp, data } => {
            let n = client.add_to_schedule(data.into_bytes(), &timestamp).await?;
            Ok(n.to_string())
        }

        Commands::Read { timestamp } => {
            let items = client.read_schedule(&timestamp).await?;
            if items.is_empty() {
                Ok("(empty)".dimmed().to_string())
            } else {
                Ok(items
                    .iter()
                    .map(|data| display_bytes(data))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }

        Commands::ScheduleLen => {
            let n = client.schedule_size().await?;
            Ok(n.to_string())
        }

        Commands::FlushSchedule => {
            let n = client.flush_schedule().await?;
            Ok(n.to_string())
        }

        Commands::Flushall => {
            let n = client.flush_all().await?;
            Ok(n.to_string())
        }

        Commands::Shutdown => {
            client.shutdown().await?;
            Ok("OK".green().to_string())
        }
    }
}

fn display_bytes(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn nil() -> String {
    "(nil)".dimmed().to_string()
}
