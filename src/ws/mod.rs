//! WebSocket layer — control frames, events, connection state.
//!
//! The actual WS transport is compile-time dispatched:
//! - `ws-native` feature → `tokio-tungstenite` (native.rs)
//! - `ws-wasm` feature → `web-sys::WebSocket` (wasm.rs)
//!
//! Inbound traffic is the gateway's caret-delimited quote format, decoded
//! by [`crate::domain::quote::wire`]; frames that fail to decode are
//! dropped silently. Outbound traffic is JSON control frames defined here.

pub mod backoff;
pub mod subscriptions;

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod wasm;

use crate::domain::quote::{DecodeConfig, QuoteRecord};
use crate::shared::Symbol;
use serde::{Deserialize, Serialize};

pub use subscriptions::{RqType, SubscribeParams, TrType, UnsubscribeParams};

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to gateway. Fire-and-forget — no
/// acknowledgement is awaited for any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageOut {
    #[serde(rename = "subscribe")]
    Subscribe(SubscribeParams),
    #[serde(rename = "unsubscribe")]
    Unsubscribe(UnsubscribeParams),
    #[serde(rename = "ping")]
    Ping,
}

impl MessageOut {
    /// Start real-time quotes for a wire symbol.
    pub fn subscribe(symbol: Symbol) -> Self {
        Self::Subscribe(SubscribeParams::current(symbol))
    }

    /// Stop real-time quotes for a wire symbol.
    pub fn unsubscribe(symbol: Symbol) -> Self {
        Self::Unsubscribe(UnsubscribeParams::current(symbol))
    }

    /// Heartbeat keepalive frame.
    pub fn ping() -> Self {
        Self::Ping
    }
}

impl std::fmt::Display for MessageOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

// ─── Connection state ────────────────────────────────────────────────────────

/// Connection lifecycle state, owned exclusively by the stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Open = 2,
    Closing = 3,
}

impl From<u8> for ConnectionState {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Connecting,
            2 => Self::Open,
            3 => Self::Closing,
            _ => Self::Disconnected,
        }
    }
}

impl ConnectionState {
    /// Map a browser `WebSocket.readyState` value.
    pub fn from_ws_ready_state(v: u16) -> Self {
        match v {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Disconnected,
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the stream client to the consumer.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Connection established.
    Connected,
    /// Connection lost (reconnect may follow).
    Disconnected { code: Option<u16>, reason: String },
    /// A decoded quote frame.
    Quote(QuoteRecord),
}

// ─── WsConfig ────────────────────────────────────────────────────────────────

/// Configuration for the stream client.
#[derive(Debug, Clone, Default)]
pub struct WsConfig {
    pub url: String,
    /// Auto-reconnect after unexpected closes.
    pub reconnect: bool,
    /// Keepalive ping cadence while open. Kept well under typical
    /// load-balancer idle timeouts.
    pub heartbeat_interval_ms: u32,
    /// First reconnect delay; doubles per failed attempt.
    pub base_reconnect_delay_ms: u32,
    /// Reconnect delay cap.
    pub max_reconnect_delay_ms: u32,
    /// Upper bound (exclusive) of the random jitter added per attempt.
    pub jitter_max_ms: u32,
    /// Positional field layouts for the quote decoder.
    pub decode: DecodeConfig,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: true,
            heartbeat_interval_ms: 25_000,
            base_reconnect_delay_ms: 1_000,
            max_reconnect_delay_ms: 30_000,
            jitter_max_ms: 1_000,
            decode: DecodeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_shape() {
        let msg = MessageOut::subscribe(Symbol::from("005930"));
        let parsed: serde_json::Value = serde_json::from_str(&msg.to_string()).unwrap();
        assert_eq!(parsed["type"], "subscribe");
        assert_eq!(parsed["tr_type"], "1");
        assert_eq!(parsed["rq_type"], "current");
        assert_eq!(parsed["symbol"], "005930");
    }

    #[test]
    fn test_unsubscribe_wire_shape() {
        let msg = MessageOut::unsubscribe(Symbol::from("DNASAAPL"));
        let parsed: serde_json::Value = serde_json::from_str(&msg.to_string()).unwrap();
        assert_eq!(parsed["type"], "unsubscribe");
        assert_eq!(parsed["tr_type"], "2");
        assert_eq!(parsed["rq_type"], "current");
        assert_eq!(parsed["symbol"], "DNASAAPL");
    }

    #[test]
    fn test_ping_wire_shape() {
        assert_eq!(MessageOut::ping().to_string(), r#"{"type":"ping"}"#);
    }

    #[test]
    fn test_connection_state_roundtrip() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Closing,
        ] {
            assert_eq!(ConnectionState::from(state as u8), state);
        }
    }

    #[test]
    fn test_browser_ready_state_mapping() {
        assert_eq!(
            ConnectionState::from_ws_ready_state(0),
            ConnectionState::Connecting
        );
        assert_eq!(ConnectionState::from_ws_ready_state(1), ConnectionState::Open);
        assert_eq!(
            ConnectionState::from_ws_ready_state(2),
            ConnectionState::Closing
        );
        assert_eq!(
            ConnectionState::from_ws_ready_state(3),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = WsConfig::new("wss://api.stocksim.app/ws");
        assert!(config.reconnect);
        assert_eq!(config.heartbeat_interval_ms, 25_000);
        assert_eq!(config.base_reconnect_delay_ms, 1_000);
        assert_eq!(config.max_reconnect_delay_ms, 30_000);
        assert_eq!(config.jitter_max_ms, 1_000);
    }
}
