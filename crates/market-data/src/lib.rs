//! # tob-market-data
//!
//! WebSocket sessions and tick parsers for the five venue feeds. The
//! [`session::ExchangeSession`] drives the connect / TLS / handshake /
//! subscribe / stream lifecycle with bounded reconnection; the
//! [`venues`] modules supply per-venue subscription payloads and frame
//! decoding into the normalized [`tob_core::types::PriceUpdate`].

pub mod session;
pub mod venues;
