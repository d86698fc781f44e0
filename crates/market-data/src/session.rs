//! Generic exchange WebSocket session with bounded reconnection.
//!
//! [`ExchangeSession`] owns one persistent connection to one venue and
//! drives it through resolve -> TCP connect -> TLS handshake -> WebSocket
//! handshake -> subscribe -> read loop. Any transient failure re-enters the
//! pipeline after a fixed delay; a successful WebSocket handshake restarts
//! the attempt budget. Reaching the attempt cap stops the session
//! permanently without affecting other sessions.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

use tob_core::types::{Exchange, PriceUpdate};

/// User-Agent header sent with every WebSocket handshake.
const USER_AGENT_VALUE: &str = "tob-feed/0.1";

/// Sink invoked for each successfully parsed tick.
///
/// Called from the I/O runtime; implementations must not block.
pub type PriceCallback = Arc<dyn Fn(PriceUpdate) + Send + Sync>;

/// A TLS WebSocket stream to one venue.
pub type WsStream = WebSocketStream<tokio_native_tls::TlsStream<TcpStream>>;

/// Venue-specific subscription and tick decoding.
///
/// Implementations are value-like and constructed statically. `parse` runs
/// synchronously on the I/O runtime between reads, so it must not block or
/// perform I/O. Frames that do not match the venue's tick shape
/// (heartbeats, event acknowledgments, subscription confirmations, unknown
/// symbols) yield `None` with no error and no logging.
pub trait TickParser: Send + Sync {
    /// The venue this parser decodes.
    fn exchange(&self) -> Exchange;

    /// Subscription payload sent as one text frame after the WebSocket
    /// handshake; `None` when the subscription is embedded in the URL path.
    fn subscribe_message(&self) -> Option<String>;

    /// Decode one inbound text frame into a normalized record.
    fn parse(&self, frame: &str) -> Option<PriceUpdate>;
}

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    Connecting,
    TlsHandshake,
    WsHandshake,
    Subscribing,
    Streaming,
    Backoff,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Resolving => "resolving",
            SessionState::Connecting => "connecting",
            SessionState::TlsHandshake => "tls_handshake",
            SessionState::WsHandshake => "ws_handshake",
            SessionState::Subscribing => "subscribing",
            SessionState::Streaming => "streaming",
            SessionState::Backoff => "backoff",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors produced by one connection cycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// DNS resolution failed.
    #[error("resolve {host}:{port} failed: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: std::io::Error,
    },
    /// TCP connect failed for every resolved address.
    #[error("connect {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },
    /// TLS handshake (including SNI setup) failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        source: native_tls::Error,
    },
    /// WebSocket upgrade failed.
    #[error("WebSocket handshake failed: {source}")]
    Handshake {
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// Writing the subscription payload failed.
    #[error("subscription write failed: {source}")]
    Subscribe {
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// The read loop failed.
    #[error("read failed: {source}")]
    Read {
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// The venue closed the stream.
    #[error("stream closed by venue")]
    StreamClosed,
    /// The reconnect attempt cap was reached; the session is terminal.
    #[error("gave up after {attempts} reconnect attempts")]
    AttemptsExhausted { attempts: u32 },
}

/// Reconnection policy: fixed delay between attempts, hard attempt cap.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay between attempts.
    pub delay: Duration,
    /// Attempts allowed before the session stops permanently.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

/// Attempt accounting for the reconnect path.
///
/// `next_delay` hands out at most `max_attempts` delays; `reset` restores
/// the full budget after a successful WebSocket handshake, so attempts are
/// counted from session start or from the last good handshake.
#[derive(Debug)]
pub struct Backoff {
    config: ReconnectConfig,
    attempts: u32,
}

impl Backoff {
    /// Create with a full attempt budget.
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Consume one attempt. Returns the delay to wait before retrying, or
    /// `None` once the cap is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.config.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.config.delay)
    }

    /// Restore the full budget.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Attempts consumed since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Endpoint and policy for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket host; also the SNI name.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path; may embed the subscription.
    pub path: String,
    /// Reconnection policy.
    pub reconnect: ReconnectConfig,
}

/// One persistent connection to one venue.
pub struct ExchangeSession {
    config: SessionConfig,
    parser: Box<dyn TickParser>,
    callback: PriceCallback,
    tls: TlsConnector,
    state: SessionState,
}

impl ExchangeSession {
    /// Create a session in the `Idle` state.
    ///
    /// The TLS connector is built once by the supervisor (system trust
    /// store, verify peer, TLS >= 1.2) and shared across sessions.
    pub fn new(
        config: SessionConfig,
        parser: Box<dyn TickParser>,
        callback: PriceCallback,
        tls: TlsConnector,
    ) -> Self {
        Self {
            config,
            parser,
            callback,
            tls,
            state: SessionState::Idle,
        }
    }

    /// The venue this session serves.
    pub fn exchange(&self) -> Exchange {
        self.parser.exchange()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!(
                exchange = %self.exchange(),
                from = %self.state,
                to = %next,
                "session state"
            );
            self.state = next;
        }
    }

    /// Drive the session until cancelled or the attempt cap is reached.
    ///
    /// Returns `Ok(())` on cooperative cancellation and
    /// [`SessionError::AttemptsExhausted`] when the session fails
    /// permanently. Either way the final state is `Stopped` and no further
    /// I/O is issued.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), SessionError> {
        let mut backoff = Backoff::new(self.config.reconnect.clone());

        loop {
            if cancel.is_cancelled() {
                self.transition(SessionState::Stopped);
                return Ok(());
            }

            match self.connect_and_stream(&cancel, &mut backoff).await {
                Ok(()) => {
                    // Cooperative stop observed inside the read loop.
                    self.transition(SessionState::Stopped);
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(exchange = %self.exchange(), error = %err, "session error");
                    self.transition(SessionState::Backoff);

                    match backoff.next_delay() {
                        Some(delay) => {
                            tracing::info!(
                                exchange = %self.exchange(),
                                attempt = backoff.attempts(),
                                delay_ms = delay.as_millis() as u64,
                                "reconnecting"
                            );
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {}
                                _ = cancel.cancelled() => {
                                    self.transition(SessionState::Stopped);
                                    return Ok(());
                                }
                            }
                        }
                        None => {
                            let attempts = backoff.attempts();
                            tracing::error!(
                                exchange = %self.exchange(),
                                attempts,
                                "max reconnection attempts reached, session stopped"
                            );
                            self.transition(SessionState::Stopped);
                            return Err(SessionError::AttemptsExhausted { attempts });
                        }
                    }
                }
            }
        }
    }

    /// One full connection cycle: establish, subscribe, stream.
    async fn connect_and_stream(
        &mut self,
        cancel: &CancellationToken,
        backoff: &mut Backoff,
    ) -> Result<(), SessionError> {
        let mut ws = self.establish(backoff).await?;
        self.subscribe(&mut ws).await?;
        self.transition(SessionState::Streaming);
        self.read_loop(&mut ws, cancel).await
    }

    /// Resolve, connect, TLS handshake, WebSocket handshake.
    async fn establish(&mut self, backoff: &mut Backoff) -> Result<WsStream, SessionError> {
        let host = self.config.host.clone();
        let port = self.config.port;

        self.transition(SessionState::Resolving);
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
            .await
            .map_err(|source| SessionError::Resolve {
                host: host.clone(),
                port,
                source,
            })?
            .collect();

        self.transition(SessionState::Connecting);
        let tcp = connect_any(&addrs, &host, port).await?;
        tcp.set_nodelay(true).ok();

        self.transition(SessionState::TlsHandshake);
        // The connector sets SNI to the host name before handshaking.
        let tls = self
            .tls
            .connect(&host, tcp)
            .await
            .map_err(|source| SessionError::Tls {
                host: host.clone(),
                source,
            })?;

        self.transition(SessionState::WsHandshake);
        let url = format!("wss://{}:{}{}", host, port, self.config.path);
        let mut request = url
            .into_client_request()
            .map_err(|source| SessionError::Handshake { source })?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let (ws, _response) = tokio_tungstenite::client_async(request, tls)
            .await
            .map_err(|source| SessionError::Handshake { source })?;

        tracing::info!(exchange = %self.exchange(), host = %host, "WebSocket connected");
        // A completed handshake restarts the attempt budget.
        backoff.reset();
        Ok(ws)
    }

    /// Send the subscription payload, if the venue needs one.
    async fn subscribe(&mut self, ws: &mut WsStream) -> Result<(), SessionError> {
        self.transition(SessionState::Subscribing);
        match self.parser.subscribe_message() {
            Some(payload) => {
                ws.send(Message::Text(payload))
                    .await
                    .map_err(|source| SessionError::Subscribe { source })?;
                tracing::info!(exchange = %self.exchange(), "subscription sent");
            }
            None => {
                tracing::info!(exchange = %self.exchange(), "subscribed via URL path");
            }
        }
        Ok(())
    }

    /// Read frames until cancellation or a connection error.
    ///
    /// Exactly one read is outstanding at a time. Text frames are parsed
    /// synchronously; frames the parser rejects are dropped without logging.
    async fn read_loop(
        &mut self,
        ws: &mut WsStream,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                msg = ws.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(update) = self.parser.parse(&text) {
                                (self.callback)(update);
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            ws.send(Message::Pong(payload))
                                .await
                                .map_err(|source| SessionError::Read { source })?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(
                                exchange = %self.exchange(),
                                frame = ?frame,
                                "close frame received"
                            );
                            return Err(SessionError::StreamClosed);
                        }
                        Some(Ok(_)) => {} // Pong, Binary, raw frames: ignore
                        Some(Err(source)) => return Err(SessionError::Read { source }),
                        None => return Err(SessionError::StreamClosed),
                    }
                }
            }
        }
    }
}

/// Connect to the first address that accepts.
async fn connect_any(
    addrs: &[SocketAddr],
    host: &str,
    port: u16,
) -> Result<TcpStream, SessionError> {
    let mut last_err: Option<std::io::Error> = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(SessionError::Connect {
        host: host.to_string(),
        port,
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        }),
    })
}
