//! Integration tests for the native stream client.
//!
//! These tests connect to a live quote gateway and exercise the full
//! connect → subscribe → receive → unsubscribe → disconnect lifecycle.
//!
//! All tests are `#[ignore]` because they require network access and a
//! running gateway (set `STOCKSIM_WS_URL` in `.env` to override the
//! default endpoint).
//!
//! Run with:
//! ```bash
//! cargo test --features ws-native --test ws_native_integration -- --ignored
//! ```

#![cfg(feature = "ws-native")]

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use stocksim_sdk::network::DEFAULT_WS_URL;
use stocksim_sdk::shared::Symbol;
use stocksim_sdk::ws::native::WsClient;
use stocksim_sdk::ws::{WsConfig, WsEvent};

const TEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A liquid domestic ticker that trades continuously during KRX hours.
const TEST_SYMBOL: &str = "005930";

fn test_config() -> WsConfig {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOCKSIM_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    WsConfig {
        reconnect: false,
        ..WsConfig::new(url)
    }
}

/// Connect and wait for the `Connected` event.
async fn connected_client() -> WsClient {
    let mut client = WsClient::new(test_config());
    client.connect().await.expect("connect should succeed");
    wait_for_connected(&client).await;
    client
}

async fn wait_for_connected(client: &WsClient) {
    let events = client.events();
    tokio::pin!(events);

    let first = timeout(TEST_TIMEOUT, events.next())
        .await
        .expect("timed out waiting for Connected")
        .expect("event stream ended");

    assert!(
        matches!(first, WsEvent::Connected),
        "first event should be Connected, got: {first:?}"
    );
}

/// Wait for the next event that matches the predicate, ignoring others.
async fn next_matching(client: &WsClient, predicate: impl Fn(&WsEvent) -> bool) -> WsEvent {
    let events = client.events();
    tokio::pin!(events);

    timeout(TEST_TIMEOUT, async {
        while let Some(ev) = events.next().await {
            if predicate(&ev) {
                return ev;
            }
        }
        panic!("event stream ended without a matching event");
    })
    .await
    .expect("timed out waiting for matching event")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn connect_and_receive_connected_event() {
    let mut client = connected_client().await;
    assert!(client.is_connected());
    client.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn subscribe_receives_quotes() {
    let mut client = connected_client().await;

    let symbol = Symbol::from(TEST_SYMBOL);
    client.subscribe(&symbol).expect("subscribe");

    let event = next_matching(&client, |ev| matches!(ev, WsEvent::Quote(_))).await;

    match event {
        WsEvent::Quote(record) => {
            assert_eq!(record.symbol.as_str(), TEST_SYMBOL);
            assert!(record.price().is_some(), "price should parse");
            assert_eq!(record.time.len(), 6, "time should be HHMMSS");
        }
        other => panic!("expected Quote, got: {other:?}"),
    }

    client.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn watch_switch_changes_feed() {
    let mut client = connected_client().await;

    let first = Symbol::from(TEST_SYMBOL);
    let second = Symbol::from("035720");

    client.subscribe(&first).expect("subscribe first");
    next_matching(&client, |ev| matches!(ev, WsEvent::Quote(_))).await;

    // Switch: unsubscribe the first symbol, subscribe the second.
    client.watch(Some(&first), &second).expect("watch switch");

    let event = next_matching(&client, |ev| {
        matches!(ev, WsEvent::Quote(q) if q.symbol.as_str() == second.as_str())
    })
    .await;
    assert!(matches!(event, WsEvent::Quote(_)));

    client.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn overseas_ticker_uses_wire_symbol() {
    let mut client = connected_client().await;

    let ticker = Symbol::from("AAPL");
    client.subscribe(&ticker).expect("subscribe");

    // The store keys on the decoded wire symbol, prefix included.
    let event = next_matching(&client, |ev| {
        matches!(ev, WsEvent::Quote(q) if q.symbol.as_str() == "DNASAAPL")
    })
    .await;
    assert!(matches!(event, WsEvent::Quote(_)));

    client.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn graceful_disconnect_is_idempotent() {
    let mut client = connected_client().await;
    assert!(client.is_connected());

    client.disconnect().await.expect("disconnect");
    assert!(!client.is_connected());

    // A second teardown produces no timer firings and no error.
    client.disconnect().await.expect("second disconnect");
    assert!(!client.is_connected());
}
