//! Venue identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Binance spot.
    Binance,
    /// Kraken spot.
    Kraken,
    /// Coinbase Exchange.
    Coinbase,
    /// Bybit spot (v5 public).
    Bybit,
    /// OKX spot (v5 public).
    Okx,
}

impl Exchange {
    /// All venues, in supervisor start order.
    pub const ALL: [Exchange; 5] = [
        Exchange::Binance,
        Exchange::Kraken,
        Exchange::Coinbase,
        Exchange::Bybit,
        Exchange::Okx,
    ];

    /// Venue label as emitted in the broadcast JSON.
    pub const fn label(&self) -> &'static str {
        match self {
            Exchange::Binance => "Binance",
            Exchange::Kraken => "Kraken",
            Exchange::Coinbase => "Coinbase",
            Exchange::Bybit => "Bybit",
            Exchange::Okx => "OKX",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_display() {
        assert_eq!(format!("{}", Exchange::Binance), "Binance");
        assert_eq!(format!("{}", Exchange::Kraken), "Kraken");
        assert_eq!(format!("{}", Exchange::Coinbase), "Coinbase");
        assert_eq!(format!("{}", Exchange::Bybit), "Bybit");
        assert_eq!(format!("{}", Exchange::Okx), "OKX");
    }

    #[test]
    fn test_all_is_exhaustive() {
        assert_eq!(Exchange::ALL.len(), 5);
        let mut seen = std::collections::HashSet::new();
        for ex in Exchange::ALL {
            assert!(seen.insert(ex), "duplicate venue in ALL");
        }
    }
}
