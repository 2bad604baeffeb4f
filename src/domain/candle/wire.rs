//! Wire types for historical chart data (REST).

use serde::{Deserialize, Serialize};

/// One OHLC bucket as served by the chart-data endpoint.
///
/// `date` is a `YYYYMMDDHHMMSS` stamp in exchange local time. Prices are
/// decimal-as-text for lossless redisplay; numeric coercion happens where
/// a consumer actually needs numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

impl Candle {
    /// The bucket's minute key (HHMM slice of the stamp), if well-formed.
    pub fn minute(&self) -> Option<&str> {
        self.date.get(8..12)
    }

    /// The bucket's date (YYYYMMDD slice of the stamp), if well-formed.
    pub fn day(&self) -> Option<&str> {
        self.date.get(0..8)
    }

    /// The bucket start as a timestamp (exchange local), for chart axes.
    pub fn bucket_start(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.date, "%Y%m%d%H%M%S").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_deserializes_from_chart_endpoint_shape() {
        let json = r#"{
            "date": "20240425093000",
            "open": "71000",
            "high": "71500",
            "low": "70800",
            "close": "71200"
        }"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.day(), Some("20240425"));
        assert_eq!(candle.minute(), Some("0930"));
        assert_eq!(candle.close, "71200");

        let start = candle.bucket_start().unwrap();
        assert_eq!(start.format("%Y-%m-%d %H:%M").to_string(), "2024-04-25 09:30");
    }

    #[test]
    fn test_malformed_stamp_yields_none() {
        let candle = Candle {
            date: "2024".to_string(),
            open: String::new(),
            high: String::new(),
            low: String::new(),
            close: String::new(),
        };
        assert_eq!(candle.day(), None);
        assert_eq!(candle.minute(), None);
    }
}
