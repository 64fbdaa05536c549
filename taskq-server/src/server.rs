//! TCP server implementation.

use crate::error::ServerError;
use crate::handler::{CommandHandler, Outcome};
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use taskq_core::Broker;
use taskq_protocol::{Decoder, ProtocolError, Value, DEFAULT_PORT};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Semaphore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Maximum concurrently served connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            max_connections: 64,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// TCP server for taskq.
pub struct Server {
    config: ServerConfig,
    handler: Arc<CommandHandler>,
    stats: Arc<ServerStats>,
    listener: TcpListener,
    slots: Arc<Semaphore>,
    shutdown: broadcast::Sender<()>,
}

impl Server {
    /// Binds the listener and prepares the server to run.
    pub async fn bind(config: ServerConfig, broker: Arc<Broker>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let slots = Arc::new(Semaphore::new(config.max_connections));
        Ok(Self {
            handler: Arc::new(CommandHandler::new(broker)),
            stats: Arc::new(ServerStats::default()),
            listener,
            slots,
            shutdown: shutdown_tx,
            config,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        tracing::info!(
            "Server listening on {} (max {} connections)",
            self.local_addr()?,
            self.config.max_connections
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            // A free processing slot is claimed before accepting, so excess
            // connections wait in the listen backlog instead of being
            // turned away.
            let permit = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                permit = self.slots.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, addr) = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                result = self.listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::error!("Accept error: {}", e);
                        continue;
                    }
                },
            };

            self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
            self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

            let handler = self.handler.clone();
            let stats = self.stats.clone();
            let shutdown = self.shutdown.clone();
            let conn_shutdown = self.shutdown.subscribe();

            tokio::spawn(async move {
                let result =
                    handle_connection(stream, addr, handler, &stats, shutdown, conn_shutdown)
                        .await;

                if let Err(e) = result {
                    tracing::debug!("Connection {} error: {}", addr, e);
                    stats.errors_total.fetch_add(1, Ordering::Relaxed);
                }

                stats.connections_active.fetch_sub(1, Ordering::Relaxed);
                drop(permit);
            });
        }

        tracing::info!("Server shutting down");
        Ok(())
    }

    /// Initiates server shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}

/// Serves one connection until disconnect, fatal protocol error, or shutdown.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    handler: Arc<CommandHandler>,
    stats: &ServerStats,
    shutdown: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ServerError> {
    tracing::info!("Connection received: {}", addr);

    let mut decoder = Decoder::new();
    let mut buf = [0u8; 8192];

    loop {
        // Serve every complete request already buffered, strictly in order.
        while let Some(request) = decoder.decode_value()? {
            // Once shutdown is signalled no further requests are dispatched.
            match shutdown_rx.try_recv() {
                Err(broadcast::error::TryRecvError::Empty) => {}
                _ => {
                    tracing::debug!("[{}] Shutdown signal received", addr);
                    return Ok(());
                }
            }

            stats.requests_total.fetch_add(1, Ordering::Relaxed);

            let reply = match catch_unwind(AssertUnwindSafe(|| handler.dispatch(request))) {
                Ok(Ok(Outcome::Reply(value))) => value,
                Ok(Ok(Outcome::Shutdown)) => {
                    // The requester gets its acknowledgment before the rest
                    // of the process starts terminating.
                    let ack = Value::Int(1).encode()?;
                    stream.write_all(&ack).await?;
                    stream.flush().await?;
                    tracing::info!("[{}] Shutdown requested", addr);
                    let _ = shutdown.send(());
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::debug!("[{}] Command error: {}", addr, e);
                    Value::Error(e.to_string())
                }
                Err(_) => {
                    // An engine-side defect must not tear down the connection.
                    tracing::error!("[{}] Unhandled error while dispatching", addr);
                    Value::Error("Unhandled server error".to_string())
                }
            };

            let bytes = reply.encode()?;
            stream.write_all(&bytes).await?;
        }

        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::debug!("[{}] Shutdown signal received", addr);
                return Ok(());
            }
            result = stream.read(&mut buf) => match result {
                Ok(0) => {
                    if decoder.buffered() == 0 {
                        tracing::info!("Client went away: {}", addr);
                        return Ok(());
                    }
                    return Err(ServerError::Protocol(ProtocolError::UnexpectedEof));
                }
                Ok(n) => decoder.extend(&buf[..n]),
                Err(e) => return Err(ServerError::Io(e)),
            },
        }
    }
}
