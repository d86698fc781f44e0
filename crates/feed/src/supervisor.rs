//! Supervisor: wires the fan-out server and venue sessions, owns shutdown.
//!
//! One shared TLS connector (system trust store, verify peer, TLS >= 1.2),
//! one fan-out server, one session per enabled venue, and a single
//! callback bridging every session into the broadcast. `SIGINT`/`SIGTERM`
//! cancel the shared token; all tasks are joined before returning.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tob_core::config::AppConfig;
use tob_core::types::{Exchange, PriceUpdate};
use tob_market_data::session::{ExchangeSession, PriceCallback, ReconnectConfig, SessionConfig};
use tob_market_data::venues;

use crate::fanout::FanOutServer;

/// Owns the runtime wiring for the whole process.
pub struct Supervisor {
    config: AppConfig,
}

impl Supervisor {
    /// Build a supervisor from configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run until a shutdown signal arrives or a fatal error surfaces.
    pub async fn run(self) -> Result<()> {
        let cancel = CancellationToken::new();

        // ── TLS context ──────────────────────────────────────────
        let tls = native_tls::TlsConnector::builder()
            .min_protocol_version(Some(native_tls::Protocol::Tlsv12))
            .build()
            .context("failed to build TLS connector")?;
        let tls = tokio_native_tls::TlsConnector::from(tls);

        // ── Fan-out server ───────────────────────────────────────
        let server = FanOutServer::bind(self.config.fanout.port)
            .await
            .context("failed to bind fan-out listener")?;
        let fanout = server.handle();
        let server_cancel = cancel.clone();
        let mut server_task = tokio::spawn(async move { server.run(server_cancel).await });

        // ── Broadcast bridge ─────────────────────────────────────
        // Sessions push into an unbounded channel so the parse callback
        // never blocks the read loop; one task drains it into the fan-out
        // in arrival order.
        let (tx, mut rx) = mpsc::unbounded_channel::<PriceUpdate>();
        let bridge_fanout = fanout.clone();
        let bridge = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                bridge_fanout.broadcast(&update).await;
            }
        });

        let callback: PriceCallback = Arc::new(move |update| {
            let _ = tx.send(update);
        });

        // ── Sessions ─────────────────────────────────────────────
        let reconnect = ReconnectConfig {
            delay: Duration::from_millis(self.config.reconnect.delay_ms),
            max_attempts: self.config.reconnect.max_attempts,
        };

        let mut sessions: Vec<JoinHandle<()>> = Vec::new();
        for exchange in Exchange::ALL {
            let venue = self.config.venue(exchange);
            if !venue.enabled {
                tracing::info!(%exchange, "venue disabled, skipping");
                continue;
            }

            let session = ExchangeSession::new(
                SessionConfig {
                    host: venue.host.clone(),
                    port: venue.port,
                    path: venue.path.clone(),
                    reconnect: reconnect.clone(),
                },
                venues::parser_for(exchange),
                callback.clone(),
                tls.clone(),
            );

            tracing::info!(%exchange, host = %venue.host, "starting session");
            let session_cancel = cancel.clone();
            sessions.push(tokio::spawn(async move {
                // A permanently failed session stops alone; the process
                // keeps serving the remaining venues.
                let _ = session.run(session_cancel).await;
            }));
        }
        drop(callback);

        // ── Shutdown ─────────────────────────────────────────────
        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
            }
            res = &mut server_task => {
                // The accept loop only ends early on a fatal error.
                cancel.cancel();
                for session in sessions {
                    let _ = session.await;
                }
                return match res {
                    Ok(Ok(())) => Err(anyhow::anyhow!("fan-out accept loop ended unexpectedly")),
                    Ok(Err(e)) => Err(e).context("fan-out server failed"),
                    Err(e) => Err(e).context("fan-out server panicked"),
                };
            }
        }

        cancel.cancel();
        for session in sessions {
            let _ = session.await;
        }
        let _ = server_task.await;
        let _ = bridge.await;

        tracing::info!("shutdown complete");
        Ok(())
    }
}
