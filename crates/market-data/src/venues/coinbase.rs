//! Coinbase ticker parsing.
//!
//! Subscription is a JSON command on the `ticker` channel; tick frames are
//! flat objects:
//!
//! ```json
//! {"type":"ticker","product_id":"SOL-USDT","best_bid":"23.41","best_ask":"23.45"}
//! ```

use serde::Deserialize;

use tob_core::types::{Exchange, PriceUpdate, SymbolMap, Timestamp};

use crate::session::TickParser;

/// Raw ticker frame. Other message types fail the `type` check.
#[derive(Debug, Deserialize)]
struct Ticker {
    /// Message type; ticks carry `"ticker"`.
    #[serde(rename = "type")]
    msg_type: String,
    /// Product id (e.g. `"SOL-USDT"`).
    product_id: String,
    /// Best bid price as a decimal string.
    best_bid: String,
    /// Best ask price as a decimal string.
    best_ask: String,
}

/// Parser for the Coinbase Exchange ticker channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinbaseParser;

impl TickParser for CoinbaseParser {
    fn exchange(&self) -> Exchange {
        Exchange::Coinbase
    }

    fn subscribe_message(&self) -> Option<String> {
        let products: Vec<&str> = SymbolMap::for_exchange(Exchange::Coinbase)
            .native_symbols()
            .collect();
        Some(
            serde_json::json!({
                "type": "subscribe",
                "product_ids": products,
                "channels": ["ticker"]
            })
            .to_string(),
        )
    }

    fn parse(&self, frame: &str) -> Option<PriceUpdate> {
        let tick: Ticker = serde_json::from_str(frame).ok()?;
        if tick.msg_type != "ticker" {
            return None;
        }
        let pair = SymbolMap::for_exchange(Exchange::Coinbase).to_canonical(&tick.product_id)?;
        Some(PriceUpdate {
            exchange: Exchange::Coinbase,
            pair,
            bid: tick.best_bid.parse().ok()?,
            ask: tick.best_ask.parse().ok()?,
            timestamp: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tob_core::types::CanonicalPair;

    const TICK: &str = r#"{"type":"ticker","sequence":12345,"product_id":"SOL-USDT","price":"23.43","best_bid":"23.41","best_ask":"23.45","time":"2023-06-01T12:00:00.000000Z"}"#;

    #[test]
    fn test_subscribe_message_format() {
        let msg = CoinbaseParser.subscribe_message().expect("payload");
        let value: serde_json::Value = serde_json::from_str(&msg).expect("valid JSON");
        assert_eq!(value["type"], "subscribe");
        assert_eq!(value["channels"][0], "ticker");
        let products = value["product_ids"].as_array().expect("product_ids");
        assert_eq!(products.len(), 4);
        assert_eq!(products[0], "BTC-USDT");
    }

    #[test]
    fn test_parse_ticker() {
        let update = CoinbaseParser.parse(TICK).expect("tick should parse");
        assert_eq!(update.exchange, Exchange::Coinbase);
        assert_eq!(update.pair, CanonicalPair::SolUsdt);
        assert!((update.bid - 23.41).abs() < 1e-9);
        assert!((update.ask - 23.45).abs() < 1e-9);
    }

    #[test]
    fn test_subscriptions_ack_is_dropped() {
        let frame = r#"{"type":"subscriptions","channels":[{"name":"ticker","product_ids":["SOL-USDT"]}]}"#;
        assert!(CoinbaseParser.parse(frame).is_none());
    }

    #[test]
    fn test_heartbeat_is_dropped() {
        let frame = r#"{"type":"heartbeat","sequence":90,"product_id":"SOL-USDT","time":"2023-06-01T12:00:00Z"}"#;
        assert!(CoinbaseParser.parse(frame).is_none());
    }

    #[test]
    fn test_unknown_product_is_dropped() {
        let frame = r#"{"type":"ticker","product_id":"BTC-USD","best_bid":"1","best_ask":"2"}"#;
        assert!(CoinbaseParser.parse(frame).is_none());
    }

    #[test]
    fn test_garbage_is_dropped() {
        assert!(CoinbaseParser.parse("not json").is_none());
        assert!(CoinbaseParser.parse("{}").is_none());
    }
}
