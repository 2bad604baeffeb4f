//! Auth sub-client — session adoption and teardown.

use crate::auth::SessionToken;
use crate::client::StocksimClient;

/// Sub-client for authentication operations.
///
/// The platform's login flow ends with an OAuth redirect that hands the
/// front end a bearer token; adopt it here. The SDK injects it on
/// authenticated endpoints until [`Auth::logout`] clears it.
pub struct Auth<'a> {
    pub(crate) client: &'a StocksimClient,
}

impl<'a> Auth<'a> {
    /// Adopt an externally-obtained session token.
    pub async fn login(&self, token: impl Into<SessionToken>) {
        self.client.http.set_session(Some(token.into())).await;
    }

    /// Drop the session token.
    pub async fn logout(&self) {
        self.client.http.set_session(None).await;
    }

    /// Whether a session token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.client.http.has_session().await
    }
}
