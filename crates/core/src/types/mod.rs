//! Core types shared across the feed.
//!
//! Exchange-specific parsers convert wire-format messages into the
//! normalized [`PriceUpdate`] record defined here; everything downstream of
//! a parser speaks only these types.

pub mod exchange;
pub mod pair;
pub mod symbol;
pub mod timestamp;
pub mod update;

// Re-export primary types for convenient access via `tob_core::types::*`.
pub use exchange::Exchange;
pub use pair::CanonicalPair;
pub use symbol::SymbolMap;
pub use timestamp::Timestamp;
pub use update::PriceUpdate;
