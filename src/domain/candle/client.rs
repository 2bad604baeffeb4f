//! Candle sub-client — historical chart data.

use crate::client::StocksimClient;
use crate::domain::candle::state::CandleSeries;
use crate::domain::candle::Candle;
use crate::error::SdkError;
use crate::shared::Symbol;

/// Sub-client for chart-data queries.
pub struct Candles<'a> {
    pub(crate) client: &'a StocksimClient,
}

impl<'a> Candles<'a> {
    /// Raw chart seed for a ticker, newest bucket first.
    pub async fn chart_data(&self, symbol: &Symbol) -> Result<Vec<Candle>, SdkError> {
        Ok(self.client.http.chart_data(symbol).await?)
    }

    /// Fetch the chart seed and wrap it in a live-updating series.
    pub async fn series(&self, symbol: &Symbol, cap: usize) -> Result<CandleSeries, SdkError> {
        let seed = self.client.http.chart_data(symbol).await?;
        Ok(CandleSeries::seeded(seed, cap))
    }
}
