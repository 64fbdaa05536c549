//! Command dispatch.
//!
//! A decoded request is an array of bulk strings: the command name followed
//! by positional arguments. The dispatcher resolves the name against a fixed
//! set of command tags and calls the matching broker operation.

use bytes::Bytes;
use std::sync::Arc;
use taskq_core::{Broker, CommandError};
use taskq_protocol::Value;

/// Command tags recognized by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // Queue commands.
    Enqueue,
    Dequeue,
    Remove,
    Flush,
    Length,

    // Key/value commands.
    Set,
    SetNx,
    Get,
    Pop,
    Delete,
    Exists,
    FlushKv,
    LengthKv,

    // Schedule commands.
    Add,
    Read,
    FlushSchedule,
    LengthSchedule,

    // Server-wide commands.
    FlushAll,
    Shutdown,
}

impl Command {
    /// Resolves an upper-cased command name to its tag.
    pub fn from_name(name: &str) -> Option<Command> {
        match name {
            "ENQUEUE" => Some(Command::Enqueue),
            "DEQUEUE" => Some(Command::Dequeue),
            "REMOVE" => Some(Command::Remove),
            "FLUSH" => Some(Command::Flush),
            "LENGTH" => Some(Command::Length),
            "SET" => Some(Command::Set),
            "SETNX" => Some(Command::SetNx),
            "GET" => Some(Command::Get),
            "POP" => Some(Command::Pop),
            "DELETE" => Some(Command::Delete),
            "EXISTS" => Some(Command::Exists),
            "FLUSH_KV" => Some(Command::FlushKv),
            "LENGTH_KV" => Some(Command::LengthKv),
            "ADD" => Some(Command::Add),
            "READ" => Some(Command::Read),
            "FLUSH_SCHEDULE" => Some(Command::FlushSchedule),
            "LENGTH_SCHEDULE" => Some(Command::LengthSchedule),
            "FLUSHALL" => Some(Command::FlushAll),
            "SHUTDOWN" => Some(Command::Shutdown),
            _ => None,
        }
    }

    /// Wire-level name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Enqueue => "ENQUEUE",
            Command::Dequeue => "DEQUEUE",
            Command::Remove => "REMOVE",
            Command::Flush => "FLUSH",
            Command::Length => "LENGTH",
            Command::Set => "SET",
            Command::SetNx => "SETNX",
            Command::Get => "GET",
            Command::Pop => "POP",
            Command::Delete => "DELETE",
            Command::Exists => "EXISTS",
            Command::FlushKv => "FLUSH_KV",
            Command::LengthKv => "LENGTH_KV",
            Command::Add => "ADD",
            Command::Read => "READ",
            Command::FlushSchedule => "FLUSH_SCHEDULE",
            Command::LengthSchedule => "LENGTH_SCHEDULE",
            Command::FlushAll => "FLUSHALL",
            Command::Shutdown => "SHUTDOWN",
        }
    }
}

/// What a dispatched request asks the connection loop to do.
#[derive(Debug)]
pub enum Outcome {
    /// Send this value back to the client and keep serving.
    Reply(Value),
    /// Acknowledge the requester, then terminate the whole server.
    Shutdown,
}

/// Maps decoded requests onto broker operations.
pub struct CommandHandler {
    broker: Arc<Broker>,
}

impl CommandHandler {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }

    /// Dispatches one decoded request.
    pub fn dispatch(&self, request: Value) -> Result<Outcome, CommandError> {
        let args = request_args(request)?;
        let (first, rest) = args
            .split_first()
            .ok_or(CommandError::MissingCommandName)?;
        let name = command_name(first)?;
        let command = Command::from_name(&name)
            .ok_or_else(|| CommandError::UnrecognizedCommand(name.clone()))?;
        tracing::debug!("dispatching {}", command.name());

        let reply = match command {
            Command::Enqueue => {
                check_arity(rest, 2, command)?;
                let queue = payload_arg(rest, 0, command)?;
                let value = payload_arg(rest, 1, command)?;
                Value::Int(self.broker.queue_append(&queue, value))
            }
            Command::Dequeue => {
                check_arity(rest, 1, command)?;
                let queue = payload_arg(rest, 0, command)?;
                maybe_bulk(self.broker.queue_pop(&queue))
            }
            Command::Remove => {
                check_arity(rest, 2, command)?;
                let queue = payload_arg(rest, 0, command)?;
                let value = payload_arg(rest, 1, command)?;
                Value::Int(self.broker.queue_remove(&queue, &value))
            }
            Command::Flush => {
                check_arity(rest, 1, command)?;
                let queue = payload_arg(rest, 0, command)?;
                Value::Int(self.broker.queue_flush(&queue))
            }
            Command::Length => {
                check_arity(rest, 1, command)?;
                let queue = payload_arg(rest, 0, command)?;
                Value::Int(self.broker.queue_length(&queue))
            }
            Command::Set => {
                check_arity(rest, 2, command)?;
                let key = payload_arg(rest, 0, command)?;
                let value = payload_arg(rest, 1, command)?;
                Value::Int(self.broker.kv_set(&key, value))
            }
            Command::SetNx => {
                check_arity(rest, 2, command)?;
                let key = payload_arg(rest, 0, command)?;
                let value = payload_arg(rest, 1, command)?;
                Value::Int(self.broker.kv_setnx(&key, value))
            }
            Command::Get => {
                check_arity(rest, 1, command)?;
                let key = payload_arg(rest, 0, command)?;
                maybe_bulk(self.broker.kv_get(&key))
            }
            Command::Pop => {
                check_arity(rest, 1, command)?;
                let key = payload_arg(rest, 0, command)?;
                maybe_bulk(self.broker.kv_pop(&key))
            }
            Command::Delete => {
                check_arity(rest, 1, command)?;
                let key = payload_arg(rest, 0, command)?;
                Value::Int(self.broker.kv_delete(&key))
            }
            Command::Exists => {
                check_arity(rest, 1, command)?;
                let key = payload_arg(rest, 0, command)?;
                Value::Int(self.broker.kv_exists(&key))
            }
            Command::FlushKv => {
                check_arity(rest, 0, command)?;
                Value::Int(self.broker.kv_flush())
            }
            Command::LengthKv => {
                check_arity(rest, 0, command)?;
                Value::Int(self.broker.kv_length())
            }
            Command::Add => {
                check_arity(rest, 2, command)?;
                let timestamp = text_arg(rest, 0, command)?;
                let payload = payload_arg(rest, 1, command)?;
                Value::Int(self.broker.schedule_add(&timestamp, payload)?)
            }
            Command::Read => {
                check_arity(rest, 1, command)?;
                let timestamp = text_arg(rest, 0, command)?;
                let items = self.broker.schedule_read(&timestamp)?;
                Value::Array(items.into_iter().map(Value::Bulk).collect())
            }
            Command::FlushSchedule => {
                check_arity(rest, 0, command)?;
                Value::Int(self.broker.schedule_flush())
            }
            Command::LengthSchedule => {
                check_arity(rest, 0, command)?;
                Value::Int(self.broker.schedule_length())
            }
            Command::FlushAll => {
                check_arity(rest, 0, command)?;
                Value::Int(self.broker.flush_all())
            }
            Command::Shutdown => {
                check_arity(rest, 0, command)?;
                return Ok(Outcome::Shutdown);
            }
        };

        Ok(Outcome::Reply(reply))
    }
}

/// Normalizes a request into its argument list.
///
/// Non-array requests are treated as a single inline line and split on
/// whitespace (lenient compatibility mode).
fn request_args(request: Value) -> Result<Vec<Value>, CommandError> {
    match request {
        Value::Array(items) => Ok(items),
        Value::Bulk(data) => Ok(split_inline(&data)),
        Value::Simple(text) => Ok(split_inline(text.as_bytes())),
        _ => Err(CommandError::UnrecognizedRequest),
    }
}

fn split_inline(data: &[u8]) -> Vec<Value> {
    data.split(|byte| byte.is_ascii_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| Value::Bulk(Bytes::copy_from_slice(word)))
        .collect()
}

/// The first element names the command and must be text.
fn command_name(first: &Value) -> Result<String, CommandError> {
    match first {
        Value::Bulk(data) => Ok(String::from_utf8_lossy(data).to_uppercase()),
        Value::Simple(text) => Ok(text.to_uppercase()),
        _ => Err(CommandError::MissingCommandName),
    }
}

fn check_arity(args: &[Value], expected: usize, command: Command) -> Result<(), CommandError> {
    if args.len() != expected {
        return Err(CommandError::WrongArity(command.name()));
    }
    Ok(())
}

/// Extracts an opaque payload argument (bulk bytes, or simple-string text).
fn payload_arg(args: &[Value], index: usize, command: Command) -> Result<Bytes, CommandError> {
    match &args[index] {
        Value::Bulk(data) => Ok(data.clone()),
        Value::Simple(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
        _ => Err(CommandError::InvalidArgument {
            command: command.name(),
            index: index + 1,
        }),
    }
}

/// Extracts a timestamp argument as text.
fn text_arg(args: &[Value], index: usize, command: Command) -> Result<String, CommandError> {
    match &args[index] {
        Value::Bulk(data) => String::from_utf8(data.to_vec()).map_err(|_| {
            CommandError::InvalidArgument {
                command: command.name(),
                index: index + 1,
            }
        }),
        Value::Simple(text) => Ok(text.clone()),
        _ => Err(CommandError::InvalidArgument {
            command: command.name(),
            index: index + 1,
        }),
    }
}

fn maybe_bulk(value: Option<Bytes>) -> Value {
    match value {
        Some(data) => Value::Bulk(data),
        None => Value::Null,
    }
}
