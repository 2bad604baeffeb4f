//! Portfolio state container — app-owned, SDK-provided update logic.

use super::Holding;
use crate::shared::Symbol;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The user's current holdings, keyed by ticker.
///
/// The app owns an instance and keeps it current from fills; the trade
/// sub-client reads it for the pre-flight sell check.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    holdings: HashMap<Symbol, Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all holdings (e.g. after a server-side refresh).
    pub fn replace(&mut self, holdings: Vec<Holding>) {
        self.holdings = holdings
            .into_iter()
            .map(|h| (h.symbol.clone(), h))
            .collect();
    }

    /// Record a buy fill, folding the price into the weighted average.
    pub fn apply_buy(&mut self, symbol: &Symbol, name: &str, quantity: u64, price: Decimal) {
        if quantity == 0 {
            return;
        }
        match self.holdings.get_mut(symbol) {
            Some(holding) => {
                let old_qty = Decimal::from(holding.quantity);
                let new_qty = Decimal::from(holding.quantity + quantity);
                holding.average_price = ((holding.average_price * old_qty
                    + price * Decimal::from(quantity))
                    / new_qty)
                    .round_dp(4);
                holding.quantity += quantity;
            }
            None => {
                self.holdings.insert(
                    symbol.clone(),
                    Holding {
                        symbol: symbol.clone(),
                        name: name.to_string(),
                        quantity,
                        average_price: price,
                    },
                );
            }
        }
    }

    /// Record a sell fill. Selling the full position removes it.
    pub fn apply_sell(&mut self, symbol: &Symbol, quantity: u64) {
        if let Some(holding) = self.holdings.get_mut(symbol) {
            holding.quantity = holding.quantity.saturating_sub(quantity);
            if holding.quantity == 0 {
                self.holdings.remove(symbol);
            }
        }
    }

    /// Quantity currently held for a ticker; 0 when absent.
    pub fn held(&self, symbol: &Symbol) -> u64 {
        self.holdings.get(symbol).map_or(0, |h| h.quantity)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_buy_creates_and_averages() {
        let mut portfolio = Portfolio::new();
        let sym = Symbol::from("AAPL");

        portfolio.apply_buy(&sym, "Apple Inc.", 10, Decimal::from(145));
        assert_eq!(portfolio.held(&sym), 10);

        portfolio.apply_buy(&sym, "Apple Inc.", 10, Decimal::from(155));
        let holding = portfolio.get(&sym).unwrap();
        assert_eq!(holding.quantity, 20);
        assert_eq!(holding.average_price, Decimal::from(150));
    }

    #[test]
    fn test_sell_reduces_and_removes() {
        let mut portfolio = Portfolio::new();
        let sym = Symbol::from("AAPL");
        portfolio.apply_buy(&sym, "Apple Inc.", 10, Decimal::from(145));

        portfolio.apply_sell(&sym, 4);
        assert_eq!(portfolio.held(&sym), 6);

        portfolio.apply_sell(&sym, 6);
        assert_eq!(portfolio.held(&sym), 0);
        assert!(portfolio.get(&sym).is_none());
    }

    #[test]
    fn test_held_unknown_symbol_is_zero() {
        let portfolio = Portfolio::new();
        assert_eq!(portfolio.held(&Symbol::from("TSLA")), 0);
    }

    #[test]
    fn test_replace() {
        let mut portfolio = Portfolio::new();
        portfolio.apply_buy(&Symbol::from("AAPL"), "Apple Inc.", 1, Decimal::ONE);
        portfolio.replace(vec![Holding {
            symbol: Symbol::from("005930"),
            name: "Samsung Electronics".to_string(),
            quantity: 3,
            average_price: Decimal::from_str("71200").unwrap(),
        }]);
        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio.held(&Symbol::from("005930")), 3);
        assert_eq!(portfolio.held(&Symbol::from("AAPL")), 0);
    }
}
