//! Portfolio domain — holdings and profit arithmetic.

pub mod state;

use crate::shared::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::Portfolio;

/// One position in the user's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    pub name: String,
    pub quantity: u64,
    pub average_price: Decimal,
}

impl Holding {
    /// Profit/loss rate against a current price, in percent rounded to
    /// two decimal places. `None` when the average price is zero.
    pub fn profit_rate(&self, current_price: Decimal) -> Option<Decimal> {
        profit_rate(self.average_price, current_price)
    }

    /// Absolute profit/loss against a current price, rounded to two
    /// decimal places.
    pub fn profit_amount(&self, current_price: Decimal) -> Decimal {
        profit_amount(self.average_price, current_price, self.quantity)
    }
}

/// `(current - average) / average * 100`, two decimal places.
pub fn profit_rate(average_price: Decimal, current_price: Decimal) -> Option<Decimal> {
    if average_price.is_zero() {
        return None;
    }
    Some(((current_price - average_price) / average_price * Decimal::from(100)).round_dp(2))
}

/// `current * quantity - average * quantity`, two decimal places.
pub fn profit_amount(average_price: Decimal, current_price: Decimal, quantity: u64) -> Decimal {
    let quantity = Decimal::from(quantity);
    (current_price * quantity - average_price * quantity).round_dp(2)
}
