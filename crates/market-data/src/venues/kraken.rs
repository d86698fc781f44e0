//! Kraken ticker parsing.
//!
//! Kraken subscribes via a JSON command and frames ticks as top-level
//! arrays:
//!
//! ```json
//! [340,{"a":["1902.12",1,"1.234"],"b":["1901.87",2,"2.345"],"c":["1902.00","0.01"]},"ticker","ETH/USDT"]
//! ```
//!
//! Events (subscription status, heartbeats) arrive as objects and are
//! ignored. Bid and ask are the first element of the `"b"` / `"a"` level
//! arrays in the payload object; the pair name is the string element
//! carrying a known Kraken symbol (normally the last element).

use serde_json::Value;

use tob_core::types::{CanonicalPair, Exchange, PriceUpdate, SymbolMap, Timestamp};

use crate::session::TickParser;

/// Parser for the Kraken v1 ticker channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct KrakenParser;

impl TickParser for KrakenParser {
    fn exchange(&self) -> Exchange {
        Exchange::Kraken
    }

    fn subscribe_message(&self) -> Option<String> {
        let pairs: Vec<&str> = SymbolMap::for_exchange(Exchange::Kraken)
            .native_symbols()
            .collect();
        Some(
            serde_json::json!({
                "event": "subscribe",
                "pair": pairs,
                "subscription": {"name": "ticker"}
            })
            .to_string(),
        )
    }

    fn parse(&self, frame: &str) -> Option<PriceUpdate> {
        let value: Value = serde_json::from_str(frame).ok()?;
        let items = value.as_array()?;

        // The channel-name element must be the literal "ticker".
        if !items.iter().any(|v| v.as_str() == Some("ticker")) {
            return None;
        }

        let pair = extract_pair(items)?;
        let data = items.iter().find(|v| v.is_object())?;
        let bid = first_price(data.get("b")?)?;
        let ask = first_price(data.get("a")?)?;

        Some(PriceUpdate {
            exchange: Exchange::Kraken,
            pair,
            bid,
            ask,
            timestamp: Timestamp::now(),
        })
    }
}

/// Find the string element that names a known Kraken pair.
///
/// Addressed by role rather than position, so a frame whose channel
/// descriptor follows the pair still resolves.
fn extract_pair(items: &[Value]) -> Option<CanonicalPair> {
    let map = SymbolMap::for_exchange(Exchange::Kraken);
    items
        .iter()
        .filter_map(|v| v.as_str())
        .find_map(|s| map.to_canonical(s))
}

/// First element of a `[price, wholeLotVolume, lotVolume]` level array.
fn first_price(level: &Value) -> Option<f64> {
    level.as_array()?.first()?.as_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: &str = r#"[340,{"a":["1902.12",1,"1.234"],"b":["1901.87",2,"2.345"],"c":["1902.00","0.01"]},"ticker","ETH/USDT"]"#;

    #[test]
    fn test_subscribe_message_lists_kraken_pairs() {
        let msg = KrakenParser.subscribe_message().expect("payload");
        let value: Value = serde_json::from_str(&msg).expect("valid JSON");
        assert_eq!(value["event"], "subscribe");
        assert_eq!(value["subscription"]["name"], "ticker");
        let pairs = value["pair"].as_array().expect("pair array");
        assert_eq!(
            pairs,
            &vec![
                Value::from("XBT/USDT"),
                Value::from("ETH/USDT"),
                Value::from("SOL/USDT"),
                Value::from("XRP/USDT"),
            ]
        );
    }

    #[test]
    fn test_parse_ticker_array() {
        let update = KrakenParser.parse(TICK).expect("tick should parse");
        assert_eq!(update.exchange, Exchange::Kraken);
        assert_eq!(update.pair, CanonicalPair::EthUsdt);
        assert!((update.bid - 1901.87).abs() < 1e-9);
        assert!((update.ask - 1902.12).abs() < 1e-9);
    }

    #[test]
    fn test_xbt_maps_to_btc() {
        let frame = r#"[1,{"a":["27000.2",1,"1"],"b":["27000.1",1,"1"]},"ticker","XBT/USDT"]"#;
        let update = KrakenParser.parse(frame).expect("tick should parse");
        assert_eq!(update.pair, CanonicalPair::BtcUsdt);
    }

    #[test]
    fn test_heartbeat_is_dropped() {
        assert!(KrakenParser.parse(r#"{"event":"heartbeat"}"#).is_none());
    }

    #[test]
    fn test_subscription_status_is_dropped() {
        let frame = r#"{"channelID":340,"channelName":"ticker","event":"subscriptionStatus","pair":"ETH/USDT","status":"subscribed"}"#;
        assert!(KrakenParser.parse(frame).is_none());
    }

    #[test]
    fn test_non_ticker_array_is_dropped() {
        let frame = r#"[42,{"b":["1.0",1,"1"],"a":["1.1",1,"1"]},"trade","ETH/USDT"]"#;
        assert!(KrakenParser.parse(frame).is_none());
    }

    #[test]
    fn test_unknown_pair_is_dropped() {
        let frame = r#"[1,{"a":["1.0",1,"1"],"b":["0.9",1,"1"]},"ticker","DOGE/USDT"]"#;
        assert!(KrakenParser.parse(frame).is_none());
    }

    #[test]
    fn test_garbage_is_dropped() {
        assert!(KrakenParser.parse("not json").is_none());
        assert!(KrakenParser.parse("[]").is_none());
        assert!(KrakenParser.parse(r#"["ticker"]"#).is_none());
    }
}
