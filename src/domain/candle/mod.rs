//! Candle domain — chart seed data and the live OHLC aggregator.

#[cfg(feature = "http")]
pub mod client;
pub mod state;
pub mod wire;

pub use state::{CandleSeries, DEFAULT_SERIES_CAP};
pub use wire::Candle;
