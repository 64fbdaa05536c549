//! High-level client API.

use crate::connection::{Connection, ConnectionConfig};
use crate::error::ClientError;
use bytes::Bytes;
use taskq_protocol::Value;
use tokio::sync::Mutex;

/// High-level client for taskq.
///
/// Method names mirror how a task-queue consumer talks to the broker:
/// queue operations carry work, data operations carry results, schedule
/// operations defer work to a later timestamp.
pub struct Client {
    conn: Mutex<Connection>,
}

impl Client {
    /// Connects to the server described by `config`.
    pub async fn connect(config: ConnectionConfig) -> Result<Self, ClientError> {
        let conn = Connection::connect(&config).await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Sends a raw command; the building block under the named methods.
    pub async fn execute(&self, args: Vec<Value>) -> Result<Value, ClientError> {
        self.conn.lock().await.execute(args).await
    }

    // =========================================================================
    // Queue operations
    // =========================================================================

    /// Pushes a payload onto the tail of the named queue.
    pub async fn enqueue(
        &self,
        queue: impl Into<Bytes>,
        data: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("ENQUEUE"),
                Value::Bulk(queue.into()),
                Value::Bulk(data.into()),
            ])
            .await?;
        int_reply(reply)
    }

    /// Pops the head of the named queue, if any.
    pub async fn dequeue(&self, queue: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("DEQUEUE"), Value::Bulk(queue.into())])
            .await?;
        maybe_bulk_reply(reply)
    }

    /// Removes the first queue entry equal to `data` (the REMOVE command).
    pub async fn unqueue(
        &self,
        queue: impl Into<Bytes>,
        data: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("REMOVE"),
                Value::Bulk(queue.into()),
                Value::Bulk(data.into()),
            ])
            .await?;
        int_reply(reply)
    }

    /// Returns the current length of the named queue.
    pub async fn queue_size(&self, queue: impl Into<Bytes>) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("LENGTH"), Value::Bulk(queue.into())])
            .await?;
        int_reply(reply)
    }

    /// Empties the named queue, returning its prior length.
    pub async fn flush_queue(&self, queue: impl Into<Bytes>) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("FLUSH"), Value::Bulk(queue.into())])
            .await?;
        int_reply(reply)
    }

    // =========================================================================
    // Schedule operations
    // =========================================================================

    /// Schedules a payload for execution at `timestamp`
    /// (`YYYY-MM-DD HH:MM:SS` with optional fractional seconds).
    pub async fn add_to_schedule(
        &self,
        data: impl Into<Bytes>,
        timestamp: &str,
    ) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("ADD"),
                Value::bulk(timestamp.as_bytes().to_vec()),
                Value::Bulk(data.into()),
            ])
            .await?;
        int_reply(reply)
    }

    /// Reads (and removes) every payload due at or before `timestamp`.
    pub async fn read_schedule(&self, timestamp: &str) -> Result<Vec<Bytes>, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("READ"),
                Value::bulk(timestamp.as_bytes().to_vec()),
            ])
            .await?;
        bulk_array_reply(reply)
    }

    /// Returns the number of scheduled payloads.
    pub async fn schedule_size(&self) -> Result<i64, ClientError> {
        let reply = self.execute(vec![Value::bulk("LENGTH_SCHEDULE")]).await?;
        int_reply(reply)
    }

    /// Empties the schedule, returning the prior entry count.
    pub async fn flush_schedule(&self) -> Result<i64, ClientError> {
        let reply = self.execute(vec![Value::bulk("FLUSH_SCHEDULE")]).await?;
        int_reply(reply)
    }

    // =========================================================================
    // Data (result store) operations
    // =========================================================================

    /// Stores a value under a key, overwriting any previous value.
    pub async fn put_data(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("SET"),
                Value::Bulk(key.into()),
                Value::Bulk(value.into()),
            ])
            .await?;
        int_reply(reply)
    }

    /// Reads the value for a key without removing it.
    pub async fn peek_data(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("GET"), Value::Bulk(key.into())])
            .await?;
        maybe_bulk_reply(reply)
    }

    /// Reads and removes the value for a key.
    pub async fn pop_data(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("POP"), Value::Bulk(key.into())])
            .await?;
        maybe_bulk_reply(reply)
    }

    /// Deletes a key; 1 if it existed, 0 otherwise.
    pub async fn delete_data(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("DELETE"), Value::Bulk(key.into())])
            .await?;
        int_reply(reply)
    }

    /// Returns whether a key currently holds a value.
    pub async fn has_data_for_key(&self, key: impl Into<Bytes>) -> Result<bool, ClientError> {
        let reply = self
            .execute(vec![Value::bulk("EXISTS"), Value::Bulk(key.into())])
            .await?;
        Ok(int_reply(reply)? == 1)
    }

    /// Stores a value only when the key is absent (the SETNX command).
    pub async fn put_if_empty(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        let reply = self
            .execute(vec![
                Value::bulk("SETNX"),
                Value::Bulk(key.into()),
                Value::Bulk(value.into()),
            ])
            .await?;
        int_reply(reply)
    }

    /// Returns the number of stored keys.
    pub async fn result_store_size(&self) -> Result<i64, ClientError> {
        let reply = self.execute(vec![Value::bulk("LENGTH_KV")]).await?;
        int_reply(reply)
    }

    /// Empties the key/value store, returning the prior entry count.
    pub async fn flush_results(&self) -> Result<i64, ClientError> {
        let reply = self.execute(vec![Value::bulk("FLUSH_KV")]).await?;
        int_reply(reply)
    }

    // =========================================================================
    // Server-wide operations
    // =========================================================================

    /// Clears queues, key/value store, and schedule.
    pub async fn flush_all(&self) -> Result<i64, ClientError> {
        let reply = self.execute(vec![Value::bulk("FLUSHALL")]).await?;
        int_reply(reply)
    }

    /// Asks the server to terminate; resolves once the acknowledgment
    /// arrives.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        let reply = self.execute(vec![Value::bulk("SHUTDOWN")]).await?;
        match reply {
            Value::Int(1) => Ok(()),
            other => Err(ClientError::UnexpectedReply(format!("{other:?}"))),
        }
    }
}

fn int_reply(reply: Value) -> Result<i64, ClientError> {
    match reply {
        Value::Int(n) => Ok(n),
        other => Err(ClientError::UnexpectedReply(format!("{other:?}"))),
    }
}

fn maybe_bulk_reply(reply: Value) -> Result<Option<Bytes>, ClientError> {
    match reply {
        Value::Bulk(data) => Ok(Some(data)),
        Value::Null => Ok(None),
        other => Err(ClientError::UnexpectedReply(format!("{other:?}"))),
    }
}

fn bulk_array_reply(reply: Value) -> Result<Vec<Bytes>, ClientError> {
    match reply {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Bulk(data) => Ok(data),
                other => Err(ClientError::UnexpectedReply(format!("{other:?}"))),
            })
            .collect(),
        other => Err(ClientError::UnexpectedReply(format!("{other:?}"))),
    }
}
