//! Candle state container — the live OHLC aggregator.

use super::wire::Candle;
use crate::domain::quote::QuoteRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Default candle series capacity.
pub const DEFAULT_SERIES_CAP: usize = 100;

/// A live-updating minute-candle series, newest first (index 0 is the
/// in-progress bucket).
///
/// The series is seeded from the chart-data endpoint and then extended
/// locally from streaming quotes: a quote in the head bucket's minute
/// mutates the head in place, a quote in a new minute prepends a fresh
/// bucket. No resampling or session alignment is performed — the server's
/// seed is trusted as-is.
///
/// The app owns instances of this type; a candlestick surface can render
/// [`CandleSeries::candles`] directly.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    cap: usize,
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_CAP)
    }
}

impl CandleSeries {
    pub fn new(cap: usize) -> Self {
        Self {
            candles: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Build a series from a chart-data seed, newest first.
    pub fn seeded(mut candles: Vec<Candle>, cap: usize) -> Self {
        let cap = cap.max(1);
        candles.truncate(cap);
        Self { candles, cap }
    }

    /// Fold one streaming quote into the series.
    ///
    /// Same minute as the head bucket: `high`/`low` widen numerically,
    /// `close` becomes the quote price, `open` is untouched. New minute:
    /// a bucket with `open = high = low = close = price` is prepended and
    /// the tail is truncated to capacity. A quote with an unusable price
    /// or time, or an invocation before any seed has loaded, is a no-op.
    pub fn apply(&mut self, quote: &QuoteRecord) {
        let Some(price) = quote.price() else { return };
        let Some(minute) = quote.minute() else { return };
        let Some((day, head_minute)) = self
            .candles
            .first()
            .and_then(|h| Some((h.day()?.to_string(), h.minute()?.to_string())))
        else {
            return;
        };

        let stamp = format!("{}{}00", day, minute);

        if head_minute == minute {
            let head = &mut self.candles[0];
            let high = Decimal::from_str(&head.high).ok();
            let low = Decimal::from_str(&head.low).ok();
            if high.map_or(true, |h| price > h) {
                head.high = quote.current_price.clone();
            }
            if low.map_or(true, |l| price < l) {
                head.low = quote.current_price.clone();
            }
            head.close = quote.current_price.clone();
            head.date = stamp;
        } else {
            let px = quote.current_price.clone();
            self.candles.insert(
                0,
                Candle {
                    date: stamp,
                    open: px.clone(),
                    high: px.clone(),
                    low: px.clone(),
                    close: px,
                },
            );
            self.candles.truncate(self.cap);
        }
    }

    /// The in-progress bucket, if any.
    pub fn head(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// All buckets, newest first.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Symbol;

    fn seed_candle(date: &str, open: &str, high: &str, low: &str, close: &str) -> Candle {
        Candle {
            date: date.to_string(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
        }
    }

    fn quote(price: &str, time: &str) -> QuoteRecord {
        QuoteRecord {
            symbol: Symbol::from("005930"),
            response_status: String::new(),
            current_price: price.to_string(),
            high: price.to_string(),
            low: price.to_string(),
            volume: "100".to_string(),
            time: time.to_string(),
        }
    }

    fn seeded_series() -> CandleSeries {
        CandleSeries::seeded(
            vec![seed_candle("20240425093000", "71000", "71400", "70900", "71200")],
            DEFAULT_SERIES_CAP,
        )
    }

    #[test]
    fn test_same_minute_widens_head_bucket() {
        let mut series = seeded_series();
        series.apply(&quote("71550", "093015"));

        let head = series.head().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(head.open, "71000");
        assert_eq!(head.high, "71550");
        assert_eq!(head.low, "70900");
        assert_eq!(head.close, "71550");
        assert_eq!(head.date, "20240425093000");
    }

    #[test]
    fn test_same_minute_lower_price_drops_low_only() {
        let mut series = seeded_series();
        series.apply(&quote("70750", "093045"));

        let head = series.head().unwrap();
        assert_eq!(head.high, "71400");
        assert_eq!(head.low, "70750");
        assert_eq!(head.close, "70750");
    }

    #[test]
    fn test_new_minute_prepends_flat_bucket() {
        let mut series = seeded_series();
        series.apply(&quote("71300", "093102"));

        assert_eq!(series.len(), 2);
        let head = series.head().unwrap();
        assert_eq!(head.date, "20240425093100");
        assert_eq!(head.open, "71300");
        assert_eq!(head.high, "71300");
        assert_eq!(head.low, "71300");
        assert_eq!(head.close, "71300");
        // The previous bucket is untouched behind it.
        assert_eq!(series.candles()[1].close, "71200");
    }

    #[test]
    fn test_series_never_exceeds_cap() {
        let mut series = CandleSeries::seeded(
            vec![seed_candle("20240425093000", "100", "100", "100", "100")],
            3,
        );
        for m in 31..40 {
            series.apply(&quote("100", &format!("09{}00", m)));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.head().unwrap().date, "20240425093900");
    }

    #[test]
    fn test_apply_before_seed_is_noop() {
        let mut series = CandleSeries::default();
        series.apply(&quote("71200", "093000"));
        assert!(series.is_empty());
    }

    #[test]
    fn test_unusable_price_or_time_is_noop() {
        let mut series = seeded_series();
        series.apply(&quote("n/a", "093015"));
        series.apply(&quote("71200", "09"));
        let head = series.head().unwrap();
        assert_eq!(head.close, "71200");
        assert_eq!(head.high, "71400");
        assert_eq!(series.len(), 1);
    }
}
