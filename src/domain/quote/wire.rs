//! Wire decoder for the gateway's real-time quote frames.
//!
//! A frame is a single text message: `^`-separated positional fields, the
//! first of which is `|`-separated metadata (sub-field 1 = transaction-type
//! code, sub-field 3 = instrument symbol). The transaction-type code selects
//! which positional layout the remaining fields follow.
//!
//! Decoding is pure and total: a frame either yields a fully-populated
//! [`QuoteRecord`] or a [`FrameError`] — never a partial record.

use crate::shared::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Transaction-type code for domestic real-time trade frames.
pub const DOMESTIC_TRADE_CODE: &str = "H0STCNT0";

/// Positional field offsets for one decoding profile.
///
/// Offsets index into the `^`-split field list. They are configuration, not
/// contract: a deployment should validate them against a live gateway sample
/// before overriding [`DecodeConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub time: usize,
    pub price: usize,
    pub high: usize,
    pub low: usize,
    pub volume: usize,
}

/// Layout for domestic real-time trades (`H0STCNT0`).
pub const DOMESTIC_LAYOUT: FieldLayout = FieldLayout {
    time: 1,
    price: 2,
    high: 8,
    low: 9,
    volume: 12,
};

/// Layout for all other instruments (overseas feeds).
pub const OVERSEAS_LAYOUT: FieldLayout = FieldLayout {
    time: 7,
    price: 11,
    high: 9,
    low: 10,
    volume: 19,
};

/// Field layouts for both decoding profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    pub domestic: FieldLayout,
    pub overseas: FieldLayout,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            domestic: DOMESTIC_LAYOUT,
            overseas: OVERSEAS_LAYOUT,
        }
    }
}

/// Reasons a frame is rejected. Rejected frames are dropped silently by the
/// stream client; this type exists for diagnostics and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has {0} field(s), need at least 3")]
    TooFewFields(usize),

    #[error("frame metadata carries no symbol")]
    EmptySymbol,

    #[error("missing field at offset {0}")]
    MissingField(usize),
}

/// One decoded market-data tick.
///
/// Price and volume fields are carried as text to avoid premature rounding;
/// numeric coercion happens at the point of use via the accessor methods.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Exact wire symbol, exchange-prefixed for overseas instruments.
    pub symbol: Symbol,
    /// Raw header/status segment (field 0), retained for diagnostics.
    pub response_status: String,
    pub current_price: String,
    pub high: String,
    pub low: String,
    /// Cumulative traded volume at tick time, text-encoded integer.
    pub volume: String,
    /// Six-digit HHMMSS exchange local time, no date component.
    pub time: String,
}

impl QuoteRecord {
    pub fn price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.current_price).ok()
    }

    pub fn high_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.high).ok()
    }

    pub fn low_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.low).ok()
    }

    pub fn volume(&self) -> Option<u64> {
        self.volume.parse().ok()
    }

    /// The tick's minute key: HHMMSS truncated to HHMM.
    pub fn minute(&self) -> Option<&str> {
        self.time.get(0..4)
    }

    /// The tick time as a wall-clock time (exchange local).
    pub fn local_time(&self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::parse_from_str(&self.time, "%H%M%S").ok()
    }
}

/// Decode a raw frame with the default field layouts.
pub fn decode(frame: &str) -> Result<QuoteRecord, FrameError> {
    decode_with(frame, &DecodeConfig::default())
}

/// Decode a raw frame with explicit field layouts.
pub fn decode_with(frame: &str, config: &DecodeConfig) -> Result<QuoteRecord, FrameError> {
    let fields: Vec<&str> = frame.split('^').collect();
    if fields.len() < 3 {
        return Err(FrameError::TooFewFields(fields.len()));
    }

    let meta = fields[0];
    let metas: Vec<&str> = meta.split('|').collect();
    let tr_code = metas.get(1).copied().unwrap_or("");
    let symbol = metas.get(3).copied().unwrap_or("");
    if symbol.is_empty() {
        return Err(FrameError::EmptySymbol);
    }

    let layout = if tr_code == DOMESTIC_TRADE_CODE {
        &config.domestic
    } else {
        &config.overseas
    };

    Ok(QuoteRecord {
        symbol: Symbol::from(symbol),
        response_status: meta.to_string(),
        current_price: field(&fields, layout.price)?.to_string(),
        high: field(&fields, layout.high)?.to_string(),
        low: field(&fields, layout.low)?.to_string(),
        volume: field(&fields, layout.volume)?.to_string(),
        time: field(&fields, layout.time)?.to_string(),
    })
}

fn field<'a>(fields: &[&'a str], offset: usize) -> Result<&'a str, FrameError> {
    fields
        .get(offset)
        .copied()
        .ok_or(FrameError::MissingField(offset))
}
