//! Network URL constants and endpoint derivation.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.stocksim.app";

/// Default WebSocket URL.
pub const DEFAULT_WS_URL: &str = "wss://api.stocksim.app/ws";

/// Path segment appended when deriving the stream URL from a page origin.
pub const DEFAULT_WS_PATH: &str = "ws";

/// Resolve the streaming endpoint URL.
///
/// If `configured` is already an absolute `ws://`/`wss://` URL it is used
/// as-is. Otherwise the URL is derived from `page_origin`
/// (e.g. `"https://stocksim.app"`): the transport scheme mirrors the page
/// scheme (`https` → `wss`, anything else → `ws`) and `configured` — or
/// [`DEFAULT_WS_PATH`] when absent — is appended as the path.
pub fn resolve_ws_url(configured: Option<&str>, page_origin: &str) -> String {
    if let Some(url) = configured {
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("ws://") || lower.starts_with("wss://") {
            return url.to_string();
        }
    }

    let origin = page_origin.trim_end_matches('/');
    let (secure, host) = match origin.split_once("://") {
        Some((scheme, host)) => (scheme.eq_ignore_ascii_case("https"), host),
        None => (false, origin),
    };
    let scheme = if secure { "wss" } else { "ws" };

    let path = configured
        .filter(|c| {
            let lower = c.to_ascii_lowercase();
            !lower.starts_with("http://") && !lower.starts_with("https://")
        })
        .map(|c| c.trim_start_matches('/'))
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_WS_PATH);

    format!("{}://{}/{}", scheme, host, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_ws_url_passes_through() {
        let url = resolve_ws_url(Some("wss://feed.example.com/ws"), "https://stocksim.app");
        assert_eq!(url, "wss://feed.example.com/ws");

        let url = resolve_ws_url(Some("WS://feed.example.com"), "https://stocksim.app");
        assert_eq!(url, "WS://feed.example.com");
    }

    #[test]
    fn test_derives_secure_scheme_from_https_origin() {
        let url = resolve_ws_url(None, "https://stocksim.app");
        assert_eq!(url, "wss://stocksim.app/ws");
    }

    #[test]
    fn test_derives_plain_scheme_from_http_origin() {
        let url = resolve_ws_url(None, "http://localhost:5173");
        assert_eq!(url, "ws://localhost:5173/ws");
    }

    #[test]
    fn test_relative_path_is_appended() {
        let url = resolve_ws_url(Some("/stream/quotes"), "https://stocksim.app");
        assert_eq!(url, "wss://stocksim.app/stream/quotes");
    }

    #[test]
    fn test_http_url_is_treated_as_unset_path() {
        // An http(s) URL is not a valid stream endpoint or path segment.
        let url = resolve_ws_url(Some("https://feed.example.com"), "https://stocksim.app");
        assert_eq!(url, "wss://stocksim.app/ws");
    }
}
