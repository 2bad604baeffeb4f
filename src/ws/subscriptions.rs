//! Subscription control-frame types, tracking, and matching.

use crate::shared::Symbol;
use crate::ws::MessageOut;
use serde::{Deserialize, Serialize};

/// Gateway transaction type: register ("1") or release ("2") a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrType {
    #[serde(rename = "1")]
    Register,
    #[serde(rename = "2")]
    Release,
}

/// Requested feed kind. Only the current-price feed exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RqType {
    #[serde(rename = "current")]
    Current,
}

/// Parameters for subscribing to a symbol's feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscribeParams {
    pub tr_type: TrType,
    pub rq_type: RqType,
    pub symbol: Symbol,
}

/// Parameters for unsubscribing from a symbol's feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnsubscribeParams {
    pub tr_type: TrType,
    pub rq_type: RqType,
    pub symbol: Symbol,
}

impl SubscribeParams {
    pub fn current(symbol: Symbol) -> Self {
        Self {
            tr_type: TrType::Register,
            rq_type: RqType::Current,
            symbol,
        }
    }

    pub fn to_unsubscribe(&self) -> UnsubscribeParams {
        UnsubscribeParams {
            tr_type: TrType::Release,
            rq_type: self.rq_type,
            symbol: self.symbol.clone(),
        }
    }

    pub fn matches_unsubscribe(&self, unsub: &UnsubscribeParams) -> bool {
        self.symbol == unsub.symbol && self.rq_type == unsub.rq_type
    }
}

impl UnsubscribeParams {
    pub fn current(symbol: Symbol) -> Self {
        Self {
            tr_type: TrType::Release,
            rq_type: RqType::Current,
            symbol,
        }
    }
}

/// Maintain the set of live subscriptions from an outbound message.
///
/// Shared by both transports; the tracked set drives resubscription after
/// a reconnect and the single unsubscribe pass at teardown.
pub(crate) fn track_subscription(subs: &mut Vec<SubscribeParams>, msg: &MessageOut) {
    match msg {
        MessageOut::Subscribe(params) => {
            if !subs.iter().any(|s| s == params) {
                tracing::debug!("Tracking subscription: {}", params.symbol);
                subs.push(params.clone());
            }
        }
        MessageOut::Unsubscribe(unsub) => {
            let before = subs.len();
            subs.retain(|s| !s.matches_unsubscribe(unsub));
            if before != subs.len() {
                tracing::debug!("Untracked subscription: {}", unsub.symbol);
            }
        }
        MessageOut::Ping => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tr_type_serializes_as_digit_strings() {
        assert_eq!(serde_json::to_string(&TrType::Register).unwrap(), "\"1\"");
        assert_eq!(serde_json::to_string(&TrType::Release).unwrap(), "\"2\"");
    }

    #[test]
    fn test_to_unsubscribe_flips_tr_type() {
        let sub = SubscribeParams::current(Symbol::from("005930"));
        let unsub = sub.to_unsubscribe();
        assert_eq!(unsub.tr_type, TrType::Release);
        assert_eq!(unsub.symbol, sub.symbol);
        assert!(sub.matches_unsubscribe(&unsub));
    }

    #[test]
    fn test_matches_unsubscribe_other_symbol() {
        let sub = SubscribeParams::current(Symbol::from("005930"));
        let unsub = UnsubscribeParams::current(Symbol::from("035720"));
        assert!(!sub.matches_unsubscribe(&unsub));
    }

    #[test]
    fn test_tracking_dedupes_and_removes() {
        let mut subs = Vec::new();
        let sub = MessageOut::subscribe(Symbol::from("005930"));

        track_subscription(&mut subs, &sub);
        track_subscription(&mut subs, &sub);
        assert_eq!(subs.len(), 1);

        track_subscription(&mut subs, &MessageOut::unsubscribe(Symbol::from("005930")));
        assert!(subs.is_empty());
    }

    #[test]
    fn test_tracking_ignores_ping() {
        let mut subs = Vec::new();
        track_subscription(&mut subs, &MessageOut::ping());
        assert!(subs.is_empty());
    }
}
