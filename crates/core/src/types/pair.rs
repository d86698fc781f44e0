//! Canonical trading pairs.
//!
//! The feed covers a closed set of four USDT-quoted pairs. Inside the
//! system a pair is always spelled `BASE/QUOTE`; venue-native spellings are
//! handled by [`super::symbol::SymbolMap`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical `BASE/USDT` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalPair {
    BtcUsdt,
    EthUsdt,
    SolUsdt,
    XrpUsdt,
}

impl CanonicalPair {
    /// All supported pairs.
    pub const ALL: [CanonicalPair; 4] = [
        CanonicalPair::BtcUsdt,
        CanonicalPair::EthUsdt,
        CanonicalPair::SolUsdt,
        CanonicalPair::XrpUsdt,
    ];

    /// Canonical `BASE/QUOTE` spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CanonicalPair::BtcUsdt => "BTC/USDT",
            CanonicalPair::EthUsdt => "ETH/USDT",
            CanonicalPair::SolUsdt => "SOL/USDT",
            CanonicalPair::XrpUsdt => "XRP/USDT",
        }
    }
}

impl fmt::Display for CanonicalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
