//! Fan-out TCP server for downstream consumers.
//!
//! Binds an IPv4 listener on a fixed port and accepts local consumers;
//! [`FanOutHandle::broadcast`] serializes a record once and writes the
//! newline-delimited JSON to every consumer in order, pruning any consumer
//! whose write fails during that same call. There is no handshake and no
//! per-consumer framing; a consumer just connects and reads lines.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tob_core::types::PriceUpdate;

/// Errors specific to the fan-out listener.
#[derive(Debug, Error)]
pub enum FanOutError {
    /// The listener could not bind its port.
    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// Accepting a consumer failed; fatal for the process.
    #[error("accept failed: {0}")]
    Accept(#[from] std::io::Error),
}

/// Live consumers, in accept order. Guarded for the whole duration of an
/// accept insertion or a broadcast iteration.
type ConsumerSet = Arc<Mutex<Vec<TcpStream>>>;

/// The accept side of the fan-out.
pub struct FanOutServer {
    listener: TcpListener,
    consumers: ConsumerSet,
}

/// The broadcast side of the fan-out; cheap to clone.
#[derive(Clone)]
pub struct FanOutHandle {
    consumers: ConsumerSet,
}

impl FanOutServer {
    /// Bind the IPv4 listener on `port` (0 picks an ephemeral port).
    pub async fn bind(port: u16) -> Result<Self, FanOutError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| FanOutError::Bind { addr, source })?;
        info!(%addr, "fan-out listening");
        Ok(Self {
            listener,
            consumers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// The actually bound address.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A broadcast handle tied to this server's consumer set.
    pub fn handle(&self) -> FanOutHandle {
        FanOutHandle {
            consumers: self.consumers.clone(),
        }
    }

    /// Accept consumers until cancelled.
    ///
    /// Returns `Err` on an accept failure, which the supervisor treats as
    /// fatal.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), FanOutError> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("fan-out accept loop stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    stream.set_nodelay(true).ok();
                    info!(%peer, "consumer connected");
                    self.consumers.lock().await.push(stream);
                }
            }
        }
    }
}

impl FanOutHandle {
    /// Broadcast one record to every connected consumer.
    ///
    /// The line is serialized once and written to each consumer in set
    /// order while the mutex is held, so every consumer observes the same
    /// total order across broadcasts. A consumer whose write errors is
    /// removed before the next consumer is attempted; failed writes are not
    /// retried and partial lines are not resent.
    pub async fn broadcast(&self, update: &PriceUpdate) {
        let line = format!("{}\n", update.to_json());
        let mut consumers = self.consumers.lock().await;

        let mut index = 0;
        while index < consumers.len() {
            match consumers[index].write_all(line.as_bytes()).await {
                Ok(()) => index += 1,
                Err(error) => {
                    let peer = consumers[index].peer_addr().ok();
                    warn!(?peer, %error, "consumer write failed, dropping consumer");
                    consumers.remove(index);
                }
            }
        }
    }

    /// Number of currently registered consumers.
    pub async fn consumer_count(&self) -> usize {
        self.consumers.lock().await.len()
    }
}
