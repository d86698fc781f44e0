//! The normalized top-of-book record.
//!
//! [`PriceUpdate`] is the unit of normalization: one best-bid/best-ask
//! observation from one venue. A record is created on each successful parse
//! and immediately handed to the fan-out; nothing stores it.

use super::exchange::Exchange;
use super::pair::CanonicalPair;
use super::timestamp::Timestamp;

/// Normalized best-bid/best-ask record.
///
/// `ask >= bid` is deliberately not enforced: some venues momentarily
/// publish crossed books and records are passed through unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    /// Source venue.
    pub exchange: Exchange,
    /// Canonical pair.
    pub pair: CanonicalPair,
    /// Best bid price.
    pub bid: f64,
    /// Best ask price.
    pub ask: f64,
    /// Instant of local receipt (not venue time).
    pub timestamp: Timestamp,
}

impl PriceUpdate {
    /// Mid price, `(bid + ask) / 2`.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Spread as a percentage of mid, `(ask - bid) / mid * 100`.
    pub fn spread_percent(&self) -> f64 {
        ((self.ask - self.bid) / self.mid()) * 100.0
    }

    /// Serialize to the single-line wire format used by the fan-out.
    ///
    /// Prices are emitted in fixed decimal notation with 8 fractional
    /// digits; the timestamp is Unix epoch milliseconds. No whitespace, no
    /// trailing newline; the fan-out appends the `\n` delimiter itself.
    pub fn to_json(&self) -> String {
        format!(
            "{{\"exchange\":\"{}\",\"pair\":\"{}\",\"bid\":{:.8},\"ask\":{:.8},\"timestamp\":{}}}",
            self.exchange, self.pair, self.bid, self.ask, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PriceUpdate {
        PriceUpdate {
            exchange: Exchange::Binance,
            pair: CanonicalPair::BtcUsdt,
            bid: 27000.10,
            ask: 27000.20,
            timestamp: Timestamp::from_millis(1706000000000),
        }
    }

    #[test]
    fn test_to_json_exact_format() {
        let json = sample().to_json();
        assert_eq!(
            json,
            "{\"exchange\":\"Binance\",\"pair\":\"BTC/USDT\",\
             \"bid\":27000.10000000,\"ask\":27000.20000000,\
             \"timestamp\":1706000000000}"
        );
    }

    #[test]
    fn test_to_json_is_one_line_and_parses_back() {
        let json = sample().to_json();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["exchange"], "Binance");
        assert_eq!(value["pair"], "BTC/USDT");
        assert_eq!(value["timestamp"], 1706000000000u64);
        assert!((value["bid"].as_f64().unwrap() - 27000.10).abs() < 1e-8);
        assert!((value["ask"].as_f64().unwrap() - 27000.20).abs() < 1e-8);
    }

    #[test]
    fn test_to_json_preserves_small_prices() {
        let update = PriceUpdate {
            exchange: Exchange::Bybit,
            pair: CanonicalPair::XrpUsdt,
            bid: 0.5010,
            ask: 0.5013,
            timestamp: Timestamp::from_millis(1),
        };
        let json = update.to_json();
        assert!(json.contains("\"bid\":0.50100000"));
        assert!(json.contains("\"ask\":0.50130000"));
    }

    #[test]
    fn test_mid() {
        let update = sample();
        assert!((update.mid() - 27000.15).abs() < 1e-9);
    }

    #[test]
    fn test_spread_percent() {
        let update = PriceUpdate {
            bid: 100.0,
            ask: 101.0,
            ..sample()
        };
        // spread = 1.0, mid = 100.5 -> ~0.995%
        assert!((update.spread_percent() - 100.0 / 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_crossed_book_passes_through() {
        let update = PriceUpdate {
            bid: 101.0,
            ask: 100.0,
            ..sample()
        };
        assert!(update.spread_percent() < 0.0);
        assert!(update.to_json().contains("\"bid\":101.00000000"));
    }
}
