//! Layered configuration for the feed.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults (the production venue endpoints, fan-out port
//!    5555, 5 s reconnect delay with a 10-attempt cap)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `TOB_`, nested with `__`,
//!    e.g. `TOB_FANOUT__PORT=6000` or `TOB_KRAKEN__ENABLED=false`)
//!
//! Running with no file and no overrides reproduces the baseline behavior
//! exactly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::Exchange;

// ── Default value functions ────────────────────────────────────────────

/// Default fan-out TCP port: 5555.
fn default_fanout_port() -> u16 {
    5555
}

/// Default reconnect delay: 5 000 ms.
fn default_reconnect_delay_ms() -> u64 {
    5_000
}

/// Default maximum reconnect attempts: 10.
fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_enabled() -> bool {
    true
}

// ── Configuration structs ──────────────────────────────────────────────

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Logging output selection.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Fan-out server settings.
    pub fanout: FanOutConfig,
    /// Reconnection policy shared by all sessions.
    pub reconnect: ReconnectConfig,
    /// Binance endpoint.
    pub binance: VenueConfig,
    /// Kraken endpoint.
    pub kraken: VenueConfig,
    /// Coinbase endpoint.
    pub coinbase: VenueConfig,
    /// Bybit endpoint.
    pub bybit: VenueConfig,
    /// OKX endpoint.
    pub okx: VenueConfig,
}

/// Logging output selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON logs instead of pretty-printed output.
    #[serde(default)]
    pub json: bool,
}

/// Fan-out server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FanOutConfig {
    /// TCP port the broadcast listener binds on (IPv4).
    #[serde(default = "default_fanout_port")]
    pub port: u16,
}

/// Session reconnection policy: fixed delay, hard attempt cap.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Delay between reconnect attempts in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub delay_ms: u64,
    /// Attempt cap after which a session stops permanently.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_attempts: u32,
}

/// One venue's WebSocket endpoint.
///
/// `host` is kept separate from the path because it doubles as the TLS SNI
/// name during the handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Whether the supervisor starts a session for this venue.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// WebSocket host (also the SNI name).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path; may embed the subscription (Binance).
    pub path: String,
}

impl AppConfig {
    /// Load configuration using layered sources.
    ///
    /// 1. Compiled-in production defaults.
    /// 2. TOML file at `config_path` (if `Some`).
    /// 3. Environment variable overrides with prefix `TOB_` and `__` as the
    ///    nesting separator (e.g., `TOB_RECONNECT__DELAY_MS=1000`).
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder()
            // ── Layer 1: compiled-in defaults ───────────────────────
            .set_default("logging.json", false)?
            .set_default("fanout.port", 5555i64)?
            .set_default("reconnect.delay_ms", 5000i64)?
            .set_default("reconnect.max_attempts", 10i64)?
            // Binance subscribes via the URL path, hence the long default.
            .set_default("binance.enabled", true)?
            .set_default("binance.host", "stream.binance.com")?
            .set_default("binance.port", 9443i64)?
            .set_default(
                "binance.path",
                "/ws/btcusdt@bookTicker/ethusdt@bookTicker/solusdt@bookTicker/xrpusdt@bookTicker",
            )?
            .set_default("kraken.enabled", true)?
            .set_default("kraken.host", "ws.kraken.com")?
            .set_default("kraken.port", 443i64)?
            .set_default("kraken.path", "/")?
            .set_default("coinbase.enabled", true)?
            .set_default("coinbase.host", "ws-feed.exchange.coinbase.com")?
            .set_default("coinbase.port", 443i64)?
            .set_default("coinbase.path", "/")?
            .set_default("bybit.enabled", true)?
            .set_default("bybit.host", "stream.bybit.com")?
            .set_default("bybit.port", 443i64)?
            .set_default("bybit.path", "/v5/public/spot")?
            .set_default("okx.enabled", true)?
            .set_default("okx.host", "ws.okx.com")?
            .set_default("okx.port", 8443i64)?
            .set_default("okx.path", "/ws/v5/public")?;

        // ── Layer 2: TOML file ─────────────────────────────────────
        if let Some(path) = config_path {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        // ── Layer 3: env var overrides (TOB_ prefix) ───────────────
        // The prefix separator must be set explicitly to `_` because the
        // `config` crate defaults it to the nesting separator when one is
        // provided. Without this, `TOB_FANOUT__PORT` would be matched
        // against prefix `tob__` instead of `tob_`.
        builder = builder.add_source(
            Environment::with_prefix("TOB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Ok(cfg)
    }

    /// The endpoint configuration for `exchange`.
    pub fn venue(&self, exchange: Exchange) -> &VenueConfig {
        match exchange {
            Exchange::Binance => &self.binance,
            Exchange::Kraken => &self.kraken,
            Exchange::Coinbase => &self.coinbase,
            Exchange::Bybit => &self.bybit,
            Exchange::Okx => &self.okx,
        }
    }
}
