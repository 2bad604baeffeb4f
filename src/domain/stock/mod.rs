//! Stock domain — instrument snapshots from the REST API.

#[cfg(feature = "http")]
pub mod client;

use crate::domain::quote::QuoteRecord;
use crate::shared::{MarketCode, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A stock snapshot as served by the current-price and search endpoints.
///
/// `price` is kept as text — the backend serves it as either a JSON string
/// or a number depending on the instrument, and consumers coerce at the
/// point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: Symbol,
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub price: String,
    pub high: f64,
    pub low: f64,
    /// Market code string (`"KSP"`, `"KSD"`, `"NAS"`, …).
    pub country: String,
    /// Instrument kind string, passed through verbatim.
    #[serde(rename = "type")]
    pub kind: String,
}

impl StockData {
    pub fn market(&self) -> Option<MarketCode> {
        MarketCode::parse(&self.country)
    }

    pub fn is_domestic(&self) -> bool {
        self.market().is_some_and(|m| m.is_domestic())
    }

    pub fn price_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.price).ok()
    }

    /// Overlay the latest streaming tick onto this snapshot.
    ///
    /// Fields the tick cannot express stay untouched; unparseable tick
    /// values are ignored rather than zeroed.
    pub fn apply_quote(&mut self, quote: &QuoteRecord) {
        if quote.price().is_some() {
            self.price = quote.current_price.clone();
        }
        if let Ok(high) = quote.high.parse() {
            self.high = high;
        }
        if let Ok(low) = quote.low.parse() {
            self.low = low;
        }
    }
}

/// Accept a JSON string or number and keep it as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_as_string_or_number() {
        let json = r#"{"symbol":"005930","name":"Samsung Electronics","price":"71200",
                       "high":71500.0,"low":70800.0,"country":"KSP","type":"stock"}"#;
        let stock: StockData = serde_json::from_str(json).unwrap();
        assert_eq!(stock.price, "71200");
        assert!(stock.is_domestic());

        let json = r#"{"symbol":"AAPL","name":"Apple Inc.","price":228.5,
                       "high":229.87,"low":227.12,"country":"NAS","type":"stock"}"#;
        let stock: StockData = serde_json::from_str(json).unwrap();
        assert_eq!(stock.price, "228.5");
        assert!(!stock.is_domestic());
    }

    #[test]
    fn test_apply_quote_overlays_tick() {
        let mut stock = StockData {
            symbol: Symbol::from("005930"),
            name: "Samsung Electronics".to_string(),
            price: "71200".to_string(),
            high: 71500.0,
            low: 70800.0,
            country: "KSP".to_string(),
            kind: "stock".to_string(),
        };

        let quote = QuoteRecord {
            symbol: Symbol::from("005930"),
            response_status: String::new(),
            current_price: "71650".to_string(),
            high: "71650".to_string(),
            low: "70750".to_string(),
            volume: "100".to_string(),
            time: "101500".to_string(),
        };
        stock.apply_quote(&quote);

        assert_eq!(stock.price, "71650");
        assert_eq!(stock.high, 71650.0);
        assert_eq!(stock.low, 70750.0);
    }

    #[test]
    fn test_apply_quote_ignores_garbage() {
        let mut stock = StockData {
            symbol: Symbol::from("005930"),
            name: String::new(),
            price: "71200".to_string(),
            high: 71500.0,
            low: 70800.0,
            country: "KSP".to_string(),
            kind: "stock".to_string(),
        };

        let quote = QuoteRecord {
            symbol: Symbol::from("005930"),
            response_status: String::new(),
            current_price: "-".to_string(),
            high: "-".to_string(),
            low: "-".to_string(),
            volume: "0".to_string(),
            time: "101500".to_string(),
        };
        stock.apply_quote(&quote);

        assert_eq!(stock.price, "71200");
        assert_eq!(stock.high, 71500.0);
        assert_eq!(stock.low, 70800.0);
    }
}
