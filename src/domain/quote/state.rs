//! Quote state container — app-owned, SDK-provided update logic.

use super::wire::QuoteRecord;
use crate::shared::Symbol;
use std::collections::{HashMap, VecDeque};

/// Default per-symbol history capacity.
pub const DEFAULT_HISTORY_CAP: usize = 10;

/// Per-symbol rolling history of decoded quotes.
///
/// Keys are the exact decoded wire symbols (exchange prefix included);
/// translate consumer tickers with [`Symbol::to_wire`] before lookup.
/// Insertion order is arrival order, and once a symbol's history exceeds
/// the capacity the oldest entries are evicted first.
///
/// The app owns instances of this type. The stream client's event loop
/// calls [`QuoteBook::merge`] for every decoded frame; readers must not
/// mutate the returned sequences.
#[derive(Debug, Clone)]
pub struct QuoteBook {
    histories: HashMap<Symbol, VecDeque<QuoteRecord>>,
    cap: usize,
}

impl Default for QuoteBook {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl QuoteBook {
    pub fn new(cap: usize) -> Self {
        Self {
            histories: HashMap::new(),
            cap: cap.max(1),
        }
    }

    /// Append a decoded quote to its symbol's history, evicting the oldest
    /// entries once the capacity is exceeded.
    pub fn merge(&mut self, record: QuoteRecord) {
        let history = self.histories.entry(record.symbol.clone()).or_default();
        history.push_back(record);
        while history.len() > self.cap {
            history.pop_front();
        }
    }

    /// Current history for a wire symbol, oldest first.
    pub fn get(&self, symbol: &Symbol) -> Option<&VecDeque<QuoteRecord>> {
        self.histories.get(symbol)
    }

    /// Most recent quote for a wire symbol.
    pub fn latest(&self, symbol: &Symbol) -> Option<&QuoteRecord> {
        self.histories.get(symbol).and_then(|h| h.back())
    }

    /// All symbols with at least one buffered quote.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.histories.keys()
    }

    pub fn clear(&mut self) {
        self.histories.clear();
    }
}
