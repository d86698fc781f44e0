//! Venue-specific tick parsers.
//!
//! One module per venue. Each supplies the subscription payload (or `None`
//! when the URL path embeds it) and decodes that venue's ticker frames into
//! [`tob_core::types::PriceUpdate`].

pub mod binance;
pub mod bybit;
pub mod coinbase;
pub mod kraken;
pub mod okx;

pub use binance::BinanceParser;
pub use bybit::BybitParser;
pub use coinbase::CoinbaseParser;
pub use kraken::KrakenParser;
pub use okx::OkxParser;

use crate::session::TickParser;
use tob_core::types::Exchange;

/// Construct the parser for `exchange`.
pub fn parser_for(exchange: Exchange) -> Box<dyn TickParser> {
    match exchange {
        Exchange::Binance => Box::new(BinanceParser),
        Exchange::Kraken => Box::new(KrakenParser),
        Exchange::Coinbase => Box::new(CoinbaseParser),
        Exchange::Bybit => Box::new(BybitParser),
        Exchange::Okx => Box::new(OkxParser),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_for_matches_exchange() {
        for exchange in Exchange::ALL {
            assert_eq!(parser_for(exchange).exchange(), exchange);
        }
    }

    #[test]
    fn test_only_binance_subscribes_via_url() {
        for exchange in Exchange::ALL {
            let parser = parser_for(exchange);
            match exchange {
                Exchange::Binance => assert!(parser.subscribe_message().is_none()),
                _ => assert!(parser.subscribe_message().is_some()),
            }
        }
    }
}
