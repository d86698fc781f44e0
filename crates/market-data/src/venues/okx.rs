//! OKX v5 ticker parsing.
//!
//! Subscription is an op command with per-instrument args; tick frames
//! carry the payload as a one-element `data` array:
//!
//! ```json
//! {"arg":{"channel":"tickers","instId":"BTC-USDT"},"data":[{"instId":"BTC-USDT","bidPx":"27000.1","askPx":"27000.2"}]}
//! ```

use serde::Deserialize;

use tob_core::types::{Exchange, PriceUpdate, SymbolMap, Timestamp};

use crate::session::TickParser;

/// Raw ticker envelope. Event frames (`{"event":"subscribe",...}`) carry no
/// `data` array and fail deserialization.
#[derive(Debug, Deserialize)]
struct TickerMessage {
    arg: TickerArg,
    data: Vec<TickerData>,
}

#[derive(Debug, Deserialize)]
struct TickerArg {
    channel: String,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(rename = "instId")]
    inst_id: String,
    #[serde(rename = "bidPx")]
    bid_px: String,
    #[serde(rename = "askPx")]
    ask_px: String,
}

/// Parser for the OKX v5 public tickers channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkxParser;

impl TickParser for OkxParser {
    fn exchange(&self) -> Exchange {
        Exchange::Okx
    }

    fn subscribe_message(&self) -> Option<String> {
        let args: Vec<serde_json::Value> = SymbolMap::for_exchange(Exchange::Okx)
            .native_symbols()
            .map(|inst_id| serde_json::json!({"channel": "tickers", "instId": inst_id}))
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
        if msg.arg.channel != "tickers" {
            return None;
        }
        let tick = msg.data.first()?;
        let pair = SymbolMap::for_exchange(Exchange::Okx).to_canonical(&tick.inst_id)?;
        Some(PriceUpdate {
            exchange: Exchange::Okx,
            pair,
            bid: tick.bid_px.parse().ok()?,
            ask: tick.ask_px.parse().ok()?,
            timestamp: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tob_core::types::CanonicalPair;

    const TICK: &str = r#"{"arg":{"channel":"tickers","instId":"BTC-USDT"},"data":[{"instId":"BTC-USDT","last":"27000.15","bidPx":"27000.1","bidSz":"1.2","askPx":"27000.2","askSz":"0.8","ts":"1706000000000"}]}"#;

    #[test]
    fn test_subscribe_message_args() {
        let msg = OkxParser.subscribe_message().expect("payload");
        let value: serde_json::Value = serde_json::from_str(&msg).expect("valid JSON");
        assert_eq!(value["op"], "subscribe");
        let args = value["args"].as_array().expect("args");
        assert_eq!(args.len(), 4);
        assert_eq!(args[0]["channel"], "tickers");
        assert_eq!(args[0]["instId"], "BTC-USDT");
        assert_eq!(args[3]["instId"], "XRP-USDT");
    }

    #[test]
    fn test_parse_ticker() {
        let update = OkxParser.parse(TICK).expect("tick should parse");
        assert_eq!(update.exchange, Exchange::Okx);
        assert_eq!(update.pair, CanonicalPair::BtcUsdt);
        assert!((update.bid - 27000.1).abs() < 1e-9);
        assert!((update.ask - 27000.2).abs() < 1e-9);
    }

    #[test]
    fn test_subscribe_event_is_dropped() {
        let frame = r#"{"event":"subscribe","arg":{"channel":"tickers","instId":"BTC-USDT"},"connId":"abc"}"#;
        assert!(OkxParser.parse(frame).is_none());
    }

    #[test]
    fn test_other_channel_is_dropped() {
        let frame = r#"{"arg":{"channel":"trades","instId":"BTC-USDT"},"data":[{"instId":"BTC-USDT","bidPx":"1","askPx":"2"}]}"#;
        assert!(OkxParser.parse(frame).is_none());
    }

    #[test]
    fn test_empty_data_is_dropped() {
        let frame = r#"{"arg":{"channel":"tickers","instId":"BTC-USDT"},"data":[]}"#;
        assert!(OkxParser.parse(frame).is_none());
    }

    #[test]
    fn test_unknown_instrument_is_dropped() {
        let frame = r#"{"arg":{"channel":"tickers","instId":"DOGE-USDT"},"data":[{"instId":"DOGE-USDT","bidPx":"0.1","askPx":"0.2"}]}"#;
        assert!(OkxParser.parse(frame).is_none());
    }

    #[test]
    fn test_garbage_is_dropped() {
        assert!(OkxParser.parse("not json").is_none());
        assert!(OkxParser.parse("pong").is_none());
        assert!(OkxParser.parse("{}").is_none());
    }
}
