//! Low-level HTTP client — `StocksimHttp`.
//!
//! One method per API endpoint, returning wire types. Internal to the SDK —
//! the high-level client wraps this with sub-client accessors.

use crate::auth::SessionToken;
use crate::domain::candle::Candle;
use crate::domain::stock::StockData;
use crate::domain::trade::{BuyOrder, SellOrder};
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::Symbol;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Low-level HTTP client for the StockSim REST API.
pub struct StocksimHttp {
    base_url: String,
    client: Client,
    /// Session token. NEVER exposed publicly.
    session: Arc<RwLock<Option<SessionToken>>>,
}

impl StocksimHttp {
    pub fn new(base_url: &str) -> Self {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build().unwrap_or_default(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub(crate) async fn set_session(&self, token: Option<SessionToken>) {
        *self.session.write().await = token;
    }

    pub(crate) async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    // ── Stocks ───────────────────────────────────────────────────────────

    pub async fn current_price(&self, symbol: &Symbol) -> Result<StockData, HttpError> {
        let url = format!("{}/stockApi/currentPrice?SYMB={}", self.base_url, symbol);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<StockData>, HttpError> {
        let url = format!(
            "{}/stockApi/search?query={}",
            self.base_url,
            urlencoding::encode(query)
        );
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Chart data ───────────────────────────────────────────────────────

    pub async fn chart_data(&self, symbol: &Symbol) -> Result<Vec<Candle>, HttpError> {
        let url = format!("{}/stockApi/chartData?SYMB={}", self.base_url, symbol);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Trading ──────────────────────────────────────────────────────────

    pub async fn buy(&self, order: &BuyOrder) -> Result<serde_json::Value, HttpError> {
        let url = format!("{}/stock/buy", self.base_url);
        self.post(&url, order, RetryPolicy::None).await
    }

    pub async fn sell(&self, order: &SellOrder) -> Result<serde_json::Value, HttpError> {
        let url = format!("{}/stock/sell", self.base_url);
        self.post(&url, order, RetryPolicy::None).await
    }

    // ── Favorites ────────────────────────────────────────────────────────

    pub async fn favorite_status(&self) -> Result<bool, HttpError> {
        let url = format!("{}/stock/like", self.base_url);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn toggle_favorite(&self, symbol: &Symbol) -> Result<serde_json::Value, HttpError> {
        let url = format!("{}/stock/like", self.base_url);
        self.post(&url, &serde_json::json!({ "symbol": symbol }), RetryPolicy::None)
            .await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::POST, url, Some(body), retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                            }
                            true
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => {
                            #[cfg(not(target_arch = "wasm32"))]
                            let retryable = re.is_connect() || re.is_timeout() || re.is_request();
                            #[cfg(target_arch = "wasm32")]
                            let retryable = re.is_timeout() || re.is_request();
                            retryable
                        }
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(token) = self.session.read().await.as_ref() {
            req = req.header("Authorization", format!("Bearer {}", token.as_str()));
        }

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited {
                retry_after_ms: None,
            }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

impl Clone for StocksimHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            session: self.session.clone(),
        }
    }
}
