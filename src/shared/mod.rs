//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw format the backend sends, so they can be used
//! directly in wire types without conversion overhead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Exchange prefix the gateway puts in front of overseas (NASDAQ) tickers
/// on the real-time feed. Domestic tickers are sent bare.
pub const OVERSEAS_WIRE_PREFIX: &str = "DNAS";

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Newtype for instrument identifiers (e.g. `"005930"`, `"AAPL"`).
///
/// Domestic tickers are all-numeric; overseas tickers start with a letter.
/// The real-time feed keys overseas instruments by `DNAS` + ticker — see
/// [`Symbol::to_wire`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a domestic (KRX) ticker. Domestic tickers start
    /// with a digit, overseas tickers with a letter.
    pub fn is_domestic(&self) -> bool {
        self.0.chars().next().is_some_and(|c| c.is_ascii_digit())
    }

    /// Translate a consumer-facing ticker to the symbol convention the
    /// real-time feed uses as its key.
    ///
    /// Overseas tickers gain the exchange prefix (`AAPL` → `DNASAAPL`);
    /// domestic tickers pass through unchanged. Callers must perform this
    /// translation before looking a ticker up in a
    /// [`QuoteBook`](crate::domain::quote::QuoteBook) — the store keys on
    /// the exact decoded wire symbol.
    pub fn to_wire(&self) -> Symbol {
        if self.0.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            Symbol(format!("{}{}", OVERSEAS_WIRE_PREFIX, self.0))
        } else {
            self.clone()
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbol(s.to_string()))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol(s))
    }
}

// ─── MarketCode ──────────────────────────────────────────────────────────────

/// Exchange/market a stock trades on, as reported by the REST API's
/// `country` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketCode {
    Kospi,
    Kosdaq,
    Nasdaq,
}

impl MarketCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kospi => "KSP",
            Self::Kosdaq => "KSD",
            Self::Nasdaq => "NAS",
        }
    }

    /// Parse the REST API's market string. Unrecognized codes yield `None`;
    /// callers fall back to overseas handling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "KSP" => Some(Self::Kospi),
            "KSD" => Some(Self::Kosdaq),
            "NAS" => Some(Self::Nasdaq),
            _ => None,
        }
    }

    pub fn is_domestic(&self) -> bool {
        matches!(self, Self::Kospi | Self::Kosdaq)
    }
}

impl std::fmt::Display for MarketCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_serde() {
        let sym = Symbol::from("005930");
        let json = serde_json::to_string(&sym).unwrap();
        assert_eq!(json, "\"005930\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(sym, back);
    }

    #[test]
    fn test_domestic_detection() {
        assert!(Symbol::from("005930").is_domestic());
        assert!(!Symbol::from("AAPL").is_domestic());
    }

    #[test]
    fn test_to_wire_prefixes_overseas() {
        assert_eq!(Symbol::from("AAPL").to_wire().as_str(), "DNASAAPL");
        assert_eq!(Symbol::from("005930").to_wire().as_str(), "005930");
    }

    #[test]
    fn test_market_code_parse() {
        assert_eq!(MarketCode::parse("KSP"), Some(MarketCode::Kospi));
        assert_eq!(MarketCode::parse("KSD"), Some(MarketCode::Kosdaq));
        assert_eq!(MarketCode::parse("NAS"), Some(MarketCode::Nasdaq));
        assert_eq!(MarketCode::parse("NYSE"), None);
    }

    #[test]
    fn test_market_code_domestic() {
        assert!(MarketCode::Kospi.is_domestic());
        assert!(MarketCode::Kosdaq.is_domestic());
        assert!(!MarketCode::Nasdaq.is_domestic());
    }
}
