//! Trade domain — order tickets and pre-flight guards.

#[cfg(feature = "http")]
pub mod client;

use crate::domain::portfolio::Portfolio;
use crate::error::TradeError;
use crate::shared::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A buy order as posted to the trading endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOrder {
    pub symbol: Symbol,
    pub amount: u64,
    pub price: Decimal,
}

/// A sell order as posted to the trading endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOrder {
    pub symbol: Symbol,
    pub amount: u64,
}

impl BuyOrder {
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.amount == 0 {
            return Err(TradeError::InvalidQuantity(self.amount));
        }
        Ok(())
    }
}

impl SellOrder {
    /// Check the order against current holdings. Runs before any network
    /// call; a violation aborts the trade locally.
    pub fn validate(&self, portfolio: &Portfolio) -> Result<(), TradeError> {
        if self.amount == 0 {
            return Err(TradeError::InvalidQuantity(self.amount));
        }
        let held = portfolio.held(&self.symbol);
        if self.amount > held {
            return Err(TradeError::InsufficientHoldings {
                requested: self.amount,
                held,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_order_rejects_zero_quantity() {
        let order = BuyOrder {
            symbol: Symbol::from("AAPL"),
            amount: 0,
            price: Decimal::from(150),
        };
        assert!(matches!(
            order.validate(),
            Err(TradeError::InvalidQuantity(0))
        ));
    }

    #[test]
    fn test_sell_order_rejects_overdraw() {
        let mut portfolio = Portfolio::new();
        portfolio.apply_buy(&Symbol::from("AAPL"), "Apple Inc.", 5, Decimal::from(145));

        let order = SellOrder {
            symbol: Symbol::from("AAPL"),
            amount: 8,
        };
        assert!(matches!(
            order.validate(&portfolio),
            Err(TradeError::InsufficientHoldings {
                requested: 8,
                held: 5
            })
        ));
    }

    #[test]
    fn test_sell_order_within_holdings_passes() {
        let mut portfolio = Portfolio::new();
        portfolio.apply_buy(&Symbol::from("AAPL"), "Apple Inc.", 5, Decimal::from(145));

        let order = SellOrder {
            symbol: Symbol::from("AAPL"),
            amount: 5,
        };
        assert!(order.validate(&portfolio).is_ok());
    }

    #[test]
    fn test_buy_order_wire_shape() {
        let order = BuyOrder {
            symbol: Symbol::from("005930"),
            amount: 3,
            price: Decimal::from(71200),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["symbol"], "005930");
        assert_eq!(json["amount"], 3);
    }
}
