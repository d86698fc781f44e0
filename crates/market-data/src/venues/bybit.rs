//! Bybit v5 spot ticker parsing.
//!
//! Subscription is an op command over `tickers.<SYMBOL>` topics; tick
//! frames nest the payload under `data`:
//!
//! ```json
//! {"topic":"tickers.XRPUSDT","type":"snapshot","data":{"symbol":"XRPUSDT","bid1Price":"0.5010","ask1Price":"0.5013"}}
//! ```

use serde::Deserialize;

use tob_core::types::{Exchange, PriceUpdate, SymbolMap, Timestamp};

use crate::session::TickParser;

/// Raw ticker envelope. Op responses (subscribe acks, pongs) have no
/// `topic`/`data` and fail deserialization.
#[derive(Debug, Deserialize)]
struct TickerMessage {
    topic: String,
    data: TickerData,
}

/// Ticker payload. The symbol is read from here, not from the topic, so a
/// nested `symbol` key elsewhere cannot confuse the lookup.
#[derive(Debug, Deserialize)]
struct TickerData {
    symbol: String,
    #[serde(rename = "bid1Price")]
    bid1_price: String,
    #[serde(rename = "ask1Price")]
    ask1_price: String,
}

/// Parser for the Bybit v5 public spot tickers channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BybitParser;

impl TickParser for BybitParser {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    fn subscribe_message(&self) -> Option<String> {
        let args: Vec<String> = SymbolMap::for_exchange(Exchange::Bybit)
            .native_symbols()
            .map(|symbol| format!("tickers.{symbol}"))
            .collect();
        Some(
            serde_json::json!({
                "op": "subscribe",
                "args": args
            })
            .to_string(),
        )
    }

    fn parse(&self, frame: &str) -> Option<PriceUpdate> {
        let msg: TickerMessage = serde_json::from_str(frame).ok()?;
        if !msg.topic.starts_with("tickers.") {
            return None;
        }
        let pair = SymbolMap::for_exchange(Exchange::Bybit).to_canonical(&msg.data.symbol)?;
        Some(PriceUpdate {
            exchange: Exchange::Bybit,
            pair,
            bid: msg.data.bid1_price.parse().ok()?,
            ask: msg.data.ask1_price.parse().ok()?,
            timestamp: Timestamp::now(),
        })
    }
}
