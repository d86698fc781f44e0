//! # tob-core
//!
//! Shared building blocks for the tob top-of-book feed: venue and pair
//! identifiers, symbol mappings, the normalized [`types::PriceUpdate`]
//! record, layered configuration, and the logging framework.

pub mod config;
pub mod logging;
pub mod types;
