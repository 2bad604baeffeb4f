//! # StockSim SDK
//!
//! A unified Rust SDK for the StockSim paper-trading platform supporting
//! both native and WASM targets.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, domain models, state containers (always
//!    available, WASM-safe)
//! 2. **Auth** — Bearer-token session handling
//! 3. **HTTP API** — `StocksimHttp` with per-endpoint retry policies
//! 4. **WebSocket** — Compile-time dispatch: `tokio-tungstenite` (native) /
//!    `web-sys` (WASM); decodes the gateway's caret-delimited quote frames
//! 5. **High-Level Client** — `StocksimClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stocksim_sdk::prelude::*;
//!
//! let client = StocksimClient::builder()
//!     .base_url("https://api.stocksim.app")
//!     .build()?;
//!
//! // Seed the detail page, then go live.
//! let symbol = Symbol::from("005930");
//! let stock = client.stocks().current_price(&symbol).await?;
//! let mut series = client.candles().series(&symbol, 100).await?;
//! let mut quotes = QuoteBook::default();
//!
//! let mut ws = client.ws_native();
//! ws.connect().await?;
//! ws.subscribe(&symbol)?;
//!
//! let events = ws.events();
//! tokio::pin!(events);
//! while let Some(event) = events.next().await {
//!     if let WsEvent::Quote(record) = event {
//!         series.apply(&record);
//!         quotes.merge(record);
//!     }
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, state containers.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants and endpoint derivation.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Authentication: session token handling.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: WebSocket ───────────────────────────────────────────────────────

/// Stream client: control frames, subscriptions, events.
pub mod ws;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `StocksimClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{MarketCode, Symbol};

    // Domain types — quote
    pub use crate::domain::quote::{decode, QuoteBook, QuoteRecord};

    // Domain types — candle
    pub use crate::domain::candle::{Candle, CandleSeries};

    // Domain types — stock, portfolio, trade
    pub use crate::domain::portfolio::{Holding, Portfolio};
    pub use crate::domain::stock::StockData;
    pub use crate::domain::trade::{BuyOrder, SellOrder};

    // Errors
    pub use crate::error::{SdkError, TradeError, WsError};

    // Network
    pub use crate::network::{resolve_ws_url, DEFAULT_API_URL, DEFAULT_WS_URL};

    // Auth
    pub use crate::auth::SessionToken;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        AuthClient, CandlesClient, StocksClient, StocksimClient, StocksimClientBuilder,
        TradesClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{
        ConnectionState, MessageOut, SubscribeParams, UnsubscribeParams, WsConfig, WsEvent,
    };
}
