//! Connection management.

use crate::error::ClientError;
use std::net::SocketAddr;
use std::time::Duration;
use taskq_protocol::{Decoder, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server address.
    pub addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// A connection to a taskq server.
///
/// The protocol is strict request/response: one request goes out and exactly
/// one reply comes back before the next request is written. There is no
/// multiplexing of in-flight requests on a single connection.
pub struct Connection {
    stream: TcpStream,
    decoder: Decoder,
}

impl Connection {
    /// Connects to the configured server.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, ClientError> {
        let stream = timeout(config.connect_timeout, TcpStream::connect(config.addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout)??;
        tracing::debug!("connected to {}", config.addr);
        Ok(Self {
            stream,
            decoder: Decoder::new(),
        })
    }

    /// Sends one request and reads one reply.
    ///
    /// An Error reply from the server is surfaced as
    /// [`ClientError::Command`].
    pub async fn execute(&mut self, args: Vec<Value>) -> Result<Value, ClientError> {
        let request = Value::Array(args).encode()?;
        self.stream.write_all(&request).await?;

        let mut buf = [0u8; 8192];
        loop {
            if let Some(reply) = self.decoder.decode_value()? {
                return match reply {
                    Value::Error(message) => Err(ClientError::Command(message)),
                    value => Ok(value),
                };
            }
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.decoder.extend(&buf[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let addr: SocketAddr = "127.0.0.1:31337".parse().unwrap();
        let config = ConnectionConfig::new(addr).with_connect_timeout(Duration::from_secs(2));
        assert_eq!(config.addr, addr);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        // Port 1 is essentially never a listening socket.
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let config = ConnectionConfig::new(addr).with_connect_timeout(Duration::from_millis(200));
        assert!(Connection::connect(&config).await.is_err());
    }
}
