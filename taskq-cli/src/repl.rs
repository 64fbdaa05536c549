//! Interactive REPL.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::net::SocketAddr;
use taskq_client::{Client, ClientError};
use taskq_protocol::Value;

const HELP_TEXT: &str = r#"
Requests are sent verbatim: <COMMAND> [args...]

Queues:      ENQUEUE <q> <data> | DEQUEUE <q> | REMOVE <q> <data>
             LENGTH <q> | FLUSH <q>
Key/value:   SET <k> <v> | SETNX <k> <v> | GET <k> | POP <k>
             DELETE <k> | EXISTS <k> | LENGTH_KV | FLUSH_KV
Schedule:    ADD "<timestamp>" <data> | READ "<timestamp>"
             LENGTH_SCHEDULE | FLUSH_SCHEDULE
Server:      FLUSHALL | SHUTDOWN

Timestamps use the form: "2024-01-01 12:00:00[.ffffff]" - quote them so
the embedded space stays inside one argument.

quit, exit   Exit the REPL
"#;

pub async fn run(client: Client, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "taskq CLI".bold().cyan());
    println!("Connected to {}.", addr);

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    // Load history
    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".taskq_history"))
        .unwrap_or_else(|_| ".taskq_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", "taskq>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match line.to_lowercase().as_str() {
                    "help" | "?" => {
                        println!("{}", HELP_TEXT);
                        continue;
                    }
                    "quit" | "exit" | "q" => break,
                    _ => {}
                }

                match send_line(&client, line).await {
                    Ok(output) => println!("{}\n", output),
                    Err(ClientError::Command(message)) => {
                        println!("{}: {}\n", "Error".red(), message);
                    }
                    Err(e) => {
                        // Connection-level failures end the session.
                        println!("{}: {}\n", "Error".red(), e);
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&history_path);

    println!("{}", "Disconnected.".dimmed());

    Ok(())
}

async fn send_line(client: &Client, line: &str) -> Result<String, ClientError> {
    let args: Vec<Value> = tokenize(line)
        .into_iter()
        .map(|word| Value::bulk(word.into_bytes()))
        .collect();
    let reply = client.execute(args).await?;
    Ok(format_value(&reply))
}

/// Splits a line into words, honoring double quotes so timestamps with an
/// embedded space travel as one argument.
fn tokenize(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Simple(text) => text.clone(),
        Value::Error(message) => format!("{}: {}", "Error".red(), message),
        Value::Int(n) => n.to_string().yellow().to_string(),
        Value::Float(f) => f.to_string().yellow().to_string(),
        Value::Bulk(data) => String::from_utf8_lossy(data).into_owned(),
        Value::Null => "(nil)".dimmed().to_string(),
        Value::Array(items) => {
            if items.is_empty() {
                return "(empty)".dimmed().to_string();
            }
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}) {}", i + 1, format_value(item)))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
