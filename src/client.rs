//! High-level client — `StocksimClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder and accessor methods.

use crate::auth::client::Auth;
use crate::domain::candle::client::Candles;
use crate::domain::stock::client::Stocks;
use crate::domain::trade::client::Trades;
use crate::error::SdkError;
use crate::http::StocksimHttp;
use crate::ws::WsConfig;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::candle::client::Candles as CandlesClient;
pub use crate::domain::stock::client::Stocks as StocksClient;
pub use crate::domain::trade::client::Trades as TradesClient;

/// The primary entry point for the StockSim SDK.
///
/// Provides nested sub-client accessors for each domain:
/// `client.stocks()`, `client.trades()`, etc.
pub struct StocksimClient {
    pub(crate) http: StocksimHttp,
    pub(crate) ws_config: WsConfig,
}

impl StocksimClient {
    pub fn builder() -> StocksimClientBuilder {
        StocksimClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn stocks(&self) -> Stocks<'_> {
        Stocks { client: self }
    }

    pub fn candles(&self) -> Candles<'_> {
        Candles { client: self }
    }

    pub fn trades(&self) -> Trades<'_> {
        Trades { client: self }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    /// Get the WS config for creating a stream client.
    ///
    /// The stream client is intentionally not embedded in `StocksimClient`
    /// because its lifetime is managed at the application layer (tied to
    /// the detail page's lifecycle).
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a new native stream client from the current config.
    #[cfg(feature = "ws-native")]
    pub fn ws_native(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }
}

impl Clone for StocksimClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            ws_config: self.ws_config.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct StocksimClientBuilder {
    base_url: String,
    ws_url: Option<String>,
    ws_config: Option<WsConfig>,
}

impl Default for StocksimClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_url: None,
            ws_config: None,
        }
    }
}

impl StocksimClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the stream endpoint. Accepts any value
    /// [`resolve_ws_url`](crate::network::resolve_ws_url) accepts — pass a
    /// page origin through that helper first when deriving from the
    /// hosting page.
    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = Some(url.to_string());
        self
    }

    /// Override the full stream config (heartbeat cadence, backoff
    /// tuning, decoder layouts). The `url` field still loses to
    /// [`StocksimClientBuilder::ws_url`] when both are given.
    pub fn ws_config(mut self, config: WsConfig) -> Self {
        self.ws_config = Some(config);
        self
    }

    pub fn build(self) -> Result<StocksimClient, SdkError> {
        let mut ws_config = self
            .ws_config
            .unwrap_or_else(|| WsConfig::new(crate::network::DEFAULT_WS_URL));
        if let Some(url) = self.ws_url {
            ws_config.url = url;
        }

        Ok(StocksimClient {
            http: StocksimHttp::new(&self.base_url),
            ws_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = StocksimClient::builder().build().unwrap();
        assert_eq!(client.ws_config().url, crate::network::DEFAULT_WS_URL);
        assert!(client.ws_config().reconnect);
    }

    #[test]
    fn test_builder_ws_url_wins_over_config() {
        let client = StocksimClient::builder()
            .ws_config(WsConfig::new("wss://a.example/ws"))
            .ws_url("wss://b.example/ws")
            .build()
            .unwrap();
        assert_eq!(client.ws_config().url, "wss://b.example/ws");
    }
}
