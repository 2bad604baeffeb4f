//! Trade sub-client — buy/sell with pre-flight guards.

use crate::client::StocksimClient;
use crate::domain::portfolio::Portfolio;
use crate::domain::trade::{BuyOrder, SellOrder};
use crate::error::{SdkError, TradeError};

/// Sub-client for trading operations.
///
/// Both methods run their guards locally and abort before any network
/// call on a violation; the backend re-validates regardless.
pub struct Trades<'a> {
    pub(crate) client: &'a StocksimClient,
}

impl<'a> Trades<'a> {
    /// Submit a buy order. Requires a session.
    pub async fn buy(&self, order: &BuyOrder) -> Result<(), SdkError> {
        if !self.client.http.has_session().await {
            return Err(TradeError::NotAuthenticated.into());
        }
        order.validate()?;
        self.client.http.buy(order).await?;
        Ok(())
    }

    /// Submit a sell order. Requires a session and sufficient holdings.
    pub async fn sell(&self, order: &SellOrder, portfolio: &Portfolio) -> Result<(), SdkError> {
        if !self.client.http.has_session().await {
            return Err(TradeError::NotAuthenticated.into());
        }
        order.validate(portfolio)?;
        self.client.http.sell(order).await?;
        Ok(())
    }
}
