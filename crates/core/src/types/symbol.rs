//! Per-venue symbol mappings.
//!
//! Every venue spells the four supported pairs in its own alphabet:
//! Binance uses lowercase concatenation (`btcusdt`), Kraken keeps the slash
//! but renames BTC to XBT (`XBT/USDT`), Coinbase and OKX use dashes
//! (`BTC-USDT`), Bybit uses uppercase concatenation (`BTCUSDT`).
//! [`SymbolMap`] is the bijection between the canonical spelling and the
//! venue-native one; both directions are total over the four pairs.

use super::exchange::Exchange;
use super::pair::CanonicalPair;

const BINANCE: &[(CanonicalPair, &str)] = &[
    (CanonicalPair::BtcUsdt, "btcusdt"),
    (CanonicalPair::EthUsdt, "ethusdt"),
    (CanonicalPair::SolUsdt, "solusdt"),
    (CanonicalPair::XrpUsdt, "xrpusdt"),
];

const KRAKEN: &[(CanonicalPair, &str)] = &[
    (CanonicalPair::BtcUsdt, "XBT/USDT"),
    (CanonicalPair::EthUsdt, "ETH/USDT"),
    (CanonicalPair::SolUsdt, "SOL/USDT"),
    (CanonicalPair::XrpUsdt, "XRP/USDT"),
];

const COINBASE: &[(CanonicalPair, &str)] = &[
    (CanonicalPair::BtcUsdt, "BTC-USDT"),
    (CanonicalPair::EthUsdt, "ETH-USDT"),
    (CanonicalPair::SolUsdt, "SOL-USDT"),
    (CanonicalPair::XrpUsdt, "XRP-USDT"),
];

const BYBIT: &[(CanonicalPair, &str)] = &[
    (CanonicalPair::BtcUsdt, "BTCUSDT"),
    (CanonicalPair::EthUsdt, "ETHUSDT"),
    (CanonicalPair::SolUsdt, "SOLUSDT"),
    (CanonicalPair::XrpUsdt, "XRPUSDT"),
];

// OKX happens to share Coinbase's dash-separated alphabet.
const OKX: &[(CanonicalPair, &str)] = COINBASE;

/// Bijection between canonical pairs and one venue's native symbols.
///
/// Backed by static tables; construction is free and the map can be held by
/// value wherever it is needed.
#[derive(Debug, Clone, Copy)]
pub struct SymbolMap {
    exchange: Exchange,
    entries: &'static [(CanonicalPair, &'static str)],
}

impl SymbolMap {
    /// The symbol map for `exchange`.
    pub const fn for_exchange(exchange: Exchange) -> Self {
        let entries = match exchange {
            Exchange::Binance => BINANCE,
            Exchange::Kraken => KRAKEN,
            Exchange::Coinbase => COINBASE,
            Exchange::Bybit => BYBIT,
            Exchange::Okx => OKX,
        };
        Self { exchange, entries }
    }

    /// The venue this map belongs to.
    pub const fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Canonical pair -> venue-native symbol. Total over the four pairs.
    pub fn to_native(&self, pair: CanonicalPair) -> &'static str {
        self.entries
            .iter()
            .find(|(p, _)| *p == pair)
            .map(|(_, native)| *native)
            .expect("symbol table covers every canonical pair")
    }

    /// Venue-native symbol -> canonical pair. `None` for unknown symbols;
    /// callers drop the frame silently in that case.
    pub fn to_canonical(&self, native: &str) -> Option<CanonicalPair> {
        self.entries
            .iter()
            .find(|(_, n)| *n == native)
            .map(|(pair, _)| *pair)
    }

    /// Native symbols in canonical pair order, for building subscriptions.
    pub fn native_symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(_, native)| *native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_venues_all_pairs() {
        for exchange in Exchange::ALL {
            let map = SymbolMap::for_exchange(exchange);
            for pair in CanonicalPair::ALL {
                let native = map.to_native(pair);
                assert_eq!(
                    map.to_canonical(native),
                    Some(pair),
                    "{exchange}: {native} should map back to {pair}"
                );
            }
        }
    }

    #[test]
    fn test_native_alphabets() {
        assert_eq!(
            SymbolMap::for_exchange(Exchange::Binance).to_native(CanonicalPair::BtcUsdt),
            "btcusdt"
        );
        assert_eq!(
            SymbolMap::for_exchange(Exchange::Kraken).to_native(CanonicalPair::BtcUsdt),
            "XBT/USDT"
        );
        assert_eq!(
            SymbolMap::for_exchange(Exchange::Coinbase).to_native(CanonicalPair::SolUsdt),
            "SOL-USDT"
        );
        assert_eq!(
            SymbolMap::for_exchange(Exchange::Bybit).to_native(CanonicalPair::XrpUsdt),
            "XRPUSDT"
        );
        assert_eq!(
            SymbolMap::for_exchange(Exchange::Okx).to_native(CanonicalPair::EthUsdt),
            "ETH-USDT"
        );
    }

    #[test]
    fn test_unknown_symbol_is_none() {
        let map = SymbolMap::for_exchange(Exchange::Binance);
        assert_eq!(map.to_canonical("dogeusdt"), None);
        assert_eq!(map.to_canonical("BTCUSDT"), None); // wrong case for Binance
        assert_eq!(map.to_canonical(""), None);
    }

    #[test]
    fn test_native_symbols_order() {
        let map = SymbolMap::for_exchange(Exchange::Bybit);
        let symbols: Vec<_> = map.native_symbols().collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"]);
    }
}
