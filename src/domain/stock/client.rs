//! Stock sub-client — snapshots, search, favorites.

use crate::client::StocksimClient;
use crate::domain::stock::StockData;
use crate::error::{AuthError, SdkError};
use crate::shared::Symbol;

/// Sub-client for stock lookups.
pub struct Stocks<'a> {
    pub(crate) client: &'a StocksimClient,
}

impl<'a> Stocks<'a> {
    /// Current snapshot for a ticker. Seeds the detail page before the
    /// streaming feed takes over.
    pub async fn current_price(&self, symbol: &Symbol) -> Result<StockData, SdkError> {
        Ok(self.client.http.current_price(symbol).await?)
    }

    /// Search stocks by symbol or name.
    pub async fn search(&self, query: &str) -> Result<Vec<StockData>, SdkError> {
        Ok(self.client.http.search(query).await?)
    }

    /// Whether the detail-page stock is in the user's favorites.
    pub async fn favorite_status(&self) -> Result<bool, SdkError> {
        Ok(self.client.http.favorite_status().await?)
    }

    /// Toggle a ticker in the user's favorites. Requires a session.
    pub async fn toggle_favorite(&self, symbol: &Symbol) -> Result<(), SdkError> {
        if !self.client.http.has_session().await {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.client.http.toggle_favorite(symbol).await?;
        Ok(())
    }
}
