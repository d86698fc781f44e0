//! Binance bookTicker parsing.
//!
//! The subscription is embedded in the URL path
//! (`/ws/btcusdt@bookTicker/...`), so no subscribe payload is sent. Tick
//! frames are flat objects:
//!
//! ```json
//! {"u":400900217,"s":"BTCUSDT","b":"27000.10","B":"0.5","a":"27000.20","A":"0.6"}
//! ```

use serde::Deserialize;

use tob_core::types::{Exchange, PriceUpdate, SymbolMap, Timestamp};

use crate::session::TickParser;

/// Raw bookTicker frame. Quantity fields (`B`/`A`) are ignored.
#[derive(Debug, Deserialize)]
struct BookTicker {
    /// Symbol (uppercase, e.g. `"BTCUSDT"`).
    #[serde(rename = "s")]
    symbol: String,
    /// Best bid price as a decimal string.
    #[serde(rename = "b")]
    bid: String,
    /// Best ask price as a decimal string.
    #[serde(rename = "a")]
    ask: String,
}

/// Parser for the Binance combined bookTicker stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinanceParser;

impl TickParser for BinanceParser {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn subscribe_message(&self) -> Option<String> {
        None
    }

    fn parse(&self, frame: &str) -> Option<PriceUpdate> {
        let tick: BookTicker = serde_json::from_str(frame).ok()?;
        // Frames carry the symbol uppercased; the Binance alphabet is
        // lowercase.
        let pair = SymbolMap::for_exchange(Exchange::Binance)
            .to_canonical(&tick.symbol.to_lowercase())?;
        Some(PriceUpdate {
            exchange: Exchange::Binance,
            pair,
            bid: tick.bid.parse().ok()?,
            ask: tick.ask.parse().ok()?,
            timestamp: Timestamp::now(),
        })
    }
}
