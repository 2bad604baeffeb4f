//! WASM stream client using `web-sys::WebSocket`.
//!
//! Same supervisor semantics as the native client — heartbeat while open,
//! backoff reconnection, subscription tracking, one unsubscribe pass at
//! teardown — expressed with `wasm-bindgen` closures and `gloo` timers.
//! All state lives in `thread_local!` statics (WASM is single-threaded);
//! the consumer provides an `on_event` callback instead of a stream.
//!
//! The host app is expected to forward `visibilitychange` transitions to
//! [`WsClient::notify_visible`] so a socket killed in a backgrounded tab
//! recovers as soon as the page is foregrounded.

use std::cell::RefCell;

use futures_util::future::{AbortHandle, Abortable};
use futures_util::stream::StreamExt;
use gloo_timers::callback::Timeout;
use gloo_timers::future::IntervalStream;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crate::domain::quote;
use crate::shared::Symbol;
use crate::ws::backoff::Backoff;
use crate::ws::subscriptions::{track_subscription, SubscribeParams};
use crate::ws::{ConnectionState, MessageOut, WsConfig, WsEvent};

thread_local! {
    static WS: RefCell<Option<WebSocket>> = const { RefCell::new(None) };
    static CONFIG: RefCell<Option<WsConfig>> = const { RefCell::new(None) };
    static ON_EVENT: RefCell<Option<Box<dyn Fn(WsEvent)>>> = const { RefCell::new(None) };
    static HEARTBEAT_ABORT: RefCell<Option<AbortHandle>> = const { RefCell::new(None) };
    static RECONNECT_TIMEOUT: RefCell<Option<Timeout>> = const { RefCell::new(None) };
    static RECONNECT_SCHEDULED: RefCell<bool> = const { RefCell::new(false) };
    static SHOULD_RECONNECT: RefCell<bool> = const { RefCell::new(false) };
    static BACKOFF: RefCell<Option<Backoff>> = const { RefCell::new(None) };
    static PENDING_MESSAGES: RefCell<Vec<MessageOut>> = const { RefCell::new(Vec::new()) };
    static ACTIVE_SUBSCRIPTIONS: RefCell<Vec<SubscribeParams>> = const { RefCell::new(Vec::new()) };
}

/// WASM stream client — unit struct with static methods.
pub struct WsClient;

impl WsClient {
    /// Initialize and connect.
    ///
    /// The `on_event` callback receives every connection event
    /// (connected, disconnected, decoded quote).
    pub fn connect(config: WsConfig, on_event: impl Fn(WsEvent) + 'static) {
        SHOULD_RECONNECT.with(|s| *s.borrow_mut() = true);
        BACKOFF.with(|b| *b.borrow_mut() = Some(Backoff::from_config(&config)));
        CONFIG.with(|c| *c.borrow_mut() = Some(config));
        ON_EVENT.with(|cb| *cb.borrow_mut() = Some(Box::new(on_event)));
        Self::do_connect();
    }

    /// Send a control frame.
    ///
    /// If connected, sends immediately. If disconnected, subscribe and
    /// unsubscribe frames are queued for the next open; pings are dropped.
    pub fn send(message: MessageOut) {
        Self::track(&message);

        let sent = WS.with(|ws| match ws.try_borrow() {
            Ok(ws_ref) => match ws_ref.as_ref() {
                Some(w) if ConnectionState::from_ws_ready_state(w.ready_state())
                    == ConnectionState::Open =>
                {
                    if let Err(e) = w.send_with_str(&message.to_string()) {
                        tracing::warn!(
                            "Failed to send message ({}): {}",
                            message,
                            extract_js_error(&e)
                        );
                    }
                    true
                }
                _ => false,
            },
            Err(e) => {
                tracing::error!("WebSocket borrow failed: {}", e);
                true // unrecoverable this tick; don't queue
            }
        });

        if !sent {
            tracing::warn!("Cannot send ({}) — WebSocket not open", message);
            if !matches!(message, MessageOut::Ping) {
                Self::queue_message(message);
            }
        }
    }

    /// Start real-time quotes for a consumer ticker (wire-translated).
    pub fn subscribe(symbol: &Symbol) {
        Self::send(MessageOut::subscribe(symbol.to_wire()));
    }

    /// Stop real-time quotes for a consumer ticker (wire-translated).
    pub fn unsubscribe(symbol: &Symbol) {
        Self::send(MessageOut::unsubscribe(symbol.to_wire()));
    }

    /// Switch the watched ticker: unsubscribe the previous one (if any and
    /// different), then subscribe the next.
    pub fn watch(previous: Option<&Symbol>, next: &Symbol) {
        if let Some(prev) = previous {
            if prev == next {
                return;
            }
            Self::unsubscribe(prev);
        }
        Self::subscribe(next);
    }

    /// Liveness check for visibility recovery.
    ///
    /// Call on `visibilitychange` to visible: if the socket is not open,
    /// any scheduled backoff wait is cancelled and a connect fires
    /// immediately. A no-op after [`WsClient::teardown`].
    pub fn notify_visible() {
        let torn_down = SHOULD_RECONNECT.with(|s| !*s.borrow());
        if torn_down || Self::is_connected() {
            return;
        }

        tracing::info!("Page visible — retrying connection now");
        Self::cancel_reconnect();
        RECONNECT_SCHEDULED.with(|s| *s.borrow_mut() = false);
        Self::do_connect();
    }

    /// Tear down the connection.
    ///
    /// Suppresses all future auto-reconnects, sends one best-effort
    /// unsubscribe per tracked symbol, cancels every timer, and closes the
    /// socket. Safe to call any number of times.
    pub fn teardown() {
        SHOULD_RECONNECT.with(|s| *s.borrow_mut() = false);
        Self::unsubscribe_active();
        Self::cancel_reconnect();
        RECONNECT_SCHEDULED.with(|s| *s.borrow_mut() = false);
        Self::cleanup_connection();
        PENDING_MESSAGES.with(|q| q.borrow_mut().clear());
        ACTIVE_SUBSCRIPTIONS.with(|subs| subs.borrow_mut().clear());
        ON_EVENT.with(|cb| *cb.borrow_mut() = None);
        CONFIG.with(|c| *c.borrow_mut() = None);
    }

    pub fn is_connected() -> bool {
        Self::state() == ConnectionState::Open
    }

    pub fn state() -> ConnectionState {
        WS.with(|ws| {
            ws.try_borrow()
                .ok()
                .and_then(|ws_ref| {
                    ws_ref
                        .as_ref()
                        .map(|w| ConnectionState::from_ws_ready_state(w.ready_state()))
                })
                .unwrap_or(ConnectionState::Disconnected)
        })
    }

    // ── Internal ──────────────────────────────────────────────────────────

    fn emit(event: WsEvent) {
        ON_EVENT.with(|cb| {
            if let Ok(cb_ref) = cb.try_borrow() {
                if let Some(f) = cb_ref.as_ref() {
                    f(event);
                }
            }
        });
    }

    fn get_config_val<T>(f: impl Fn(&WsConfig) -> T, default: T) -> T {
        CONFIG.with(|c| c.borrow().as_ref().map(f).unwrap_or(default))
    }

    fn do_connect() {
        match Self::state() {
            ConnectionState::Connecting | ConnectionState::Open => {
                tracing::info!("Already connected or connecting, skipping");
                return;
            }
            _ => {}
        }

        let url = Self::get_config_val(|c| c.url.clone(), String::new());
        tracing::info!("Opening WebSocket to {}", url);

        match WebSocket::new(&url) {
            Err(err) => {
                tracing::error!("Failed to create WebSocket: {}", extract_js_error(&err));
                Self::schedule_reconnect();
            }
            Ok(ws) => {
                Self::setup_connection(ws);
            }
        }
    }

    fn setup_connection(ws: WebSocket) {
        let onopen = Closure::<dyn FnMut()>::new(move || {
            tracing::info!("WebSocket opened");

            RECONNECT_SCHEDULED.with(|s| *s.borrow_mut() = false);
            BACKOFF.with(|b| {
                if let Some(backoff) = b.borrow_mut().as_mut() {
                    backoff.reset();
                }
            });

            WsClient::cancel_reconnect();
            WsClient::start_heartbeat();
            WsClient::flush_pending_messages();
            WsClient::resubscribe_all();
            WsClient::emit(WsEvent::Connected);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let onmessage = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                let txt: String = txt.into();
                let config = WsClient::get_config_val(|c| c.decode, Default::default());

                match quote::decode_with(&txt, &config) {
                    Ok(record) => WsClient::emit(WsEvent::Quote(record)),
                    Err(err) => {
                        // Control acks and malformed frames land here;
                        // both are dropped without surfacing.
                        tracing::trace!("Dropping frame: {}", err);
                    }
                }
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onerror = Closure::<dyn FnMut(_)>::new(move |e: ErrorEvent| {
            // onclose follows; no close here to avoid a double teardown.
            tracing::error!("WebSocket error: {}", extract_js_error(&e.error()));
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            let code = e.code();
            let reason = e.reason();
            tracing::info!("WebSocket closed: code={}, reason={}", code, reason);

            WsClient::cleanup_connection();
            WsClient::emit(WsEvent::Disconnected {
                code: Some(code),
                reason,
            });

            if SHOULD_RECONNECT.with(|s| *s.borrow()) {
                WsClient::schedule_reconnect();
            }
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        WS.with(|ws_cell| {
            if let Ok(mut ws_ref) = ws_cell.try_borrow_mut() {
                *ws_ref = Some(ws);
            } else {
                tracing::error!("Could not store WebSocket - cell already borrowed");
            }
        });
    }

    // ── Heartbeat ─────────────────────────────────────────────────────────

    fn start_heartbeat() {
        HEARTBEAT_ABORT.with(|abort| {
            if let Ok(mut abort_ref) = abort.try_borrow_mut() {
                if let Some(handle) = abort_ref.take() {
                    handle.abort();
                }
            }
        });

        let interval_ms = Self::get_config_val(|c| c.heartbeat_interval_ms, 25_000);
        let (abort_handle, abort_reg) = AbortHandle::new_pair();

        wasm_bindgen_futures::spawn_local({
            let heartbeat = async move {
                let mut interval = IntervalStream::new(interval_ms);

                while interval.next().await.is_some() {
                    if !WsClient::is_connected() {
                        tracing::debug!("WebSocket not connected, stopping heartbeat");
                        break;
                    }
                    // Best-effort keepalive; failures are logged in send().
                    WsClient::send(MessageOut::ping());
                }
            };

            async move {
                let _ = Abortable::new(heartbeat, abort_reg).await;
            }
        });

        HEARTBEAT_ABORT.with(|abort| {
            if let Ok(mut abort_ref) = abort.try_borrow_mut() {
                *abort_ref = Some(abort_handle);
            }
        });
    }

    // ── Reconnection ──────────────────────────────────────────────────────

    fn schedule_reconnect() {
        if SHOULD_RECONNECT.with(|s| !*s.borrow()) {
            return;
        }

        let already_scheduled = RECONNECT_SCHEDULED.with(|s| {
            let mut flag = s.borrow_mut();
            std::mem::replace(&mut *flag, true)
        });
        if already_scheduled {
            tracing::debug!("Reconnect already scheduled, skipping");
            return;
        }

        let delay = BACKOFF.with(|b| {
            b.borrow_mut()
                .as_mut()
                .map(|backoff| backoff.next_delay_with(js_sys::Math::random()))
                .unwrap_or_default()
        });
        let delay_ms = delay.as_millis() as u32;

        tracing::info!("Scheduling reconnect in {}ms", delay_ms);

        RECONNECT_TIMEOUT.with(|timeout| {
            if let Ok(mut timeout_ref) = timeout.try_borrow_mut() {
                timeout_ref.take();
                *timeout_ref = Some(Timeout::new(delay_ms, || {
                    RECONNECT_SCHEDULED.with(|s| *s.borrow_mut() = false);
                    WsClient::do_connect();
                }));
            }
        });
    }

    fn cancel_reconnect() {
        RECONNECT_TIMEOUT.with(|timeout| {
            if let Ok(mut timeout_ref) = timeout.try_borrow_mut() {
                timeout_ref.take();
            }
        });
    }

    // ── Connection cleanup ────────────────────────────────────────────────

    fn cleanup_connection() {
        HEARTBEAT_ABORT.with(|abort| {
            if let Ok(mut abort_ref) = abort.try_borrow_mut() {
                if let Some(handle) = abort_ref.take() {
                    handle.abort();
                }
            }
        });

        WS.with(|ws| {
            if let Ok(mut ws_ref) = ws.try_borrow_mut() {
                if let Some(w) = ws_ref.take() {
                    w.set_onopen(None);
                    w.set_onmessage(None);
                    w.set_onerror(None);
                    w.set_onclose(None);

                    if ConnectionState::from_ws_ready_state(w.ready_state())
                        == ConnectionState::Open
                    {
                        let _ = w.close();
                    }
                }
            }
        });
    }

    // ── Message queue ─────────────────────────────────────────────────────

    fn queue_message(message: MessageOut) {
        PENDING_MESSAGES.with(|queue| {
            if let Ok(mut q) = queue.try_borrow_mut() {
                tracing::debug!("Queueing message for next open: {}", message);
                q.push(message);
            }
        });
    }

    fn flush_pending_messages() {
        let messages = PENDING_MESSAGES.with(|queue| {
            queue
                .try_borrow_mut()
                .map(|mut q| std::mem::take(&mut *q))
                .unwrap_or_default()
        });

        if !messages.is_empty() {
            tracing::info!("Flushing {} pending message(s)", messages.len());
            for msg in messages {
                Self::send_without_tracking(msg);
            }
        }
    }

    // ── Subscription tracking ─────────────────────────────────────────────

    fn track(message: &MessageOut) {
        ACTIVE_SUBSCRIPTIONS.with(|subs| {
            if let Ok(mut subs_ref) = subs.try_borrow_mut() {
                track_subscription(&mut subs_ref, message);
            }
        });
    }

    fn resubscribe_all() {
        let subscriptions = ACTIVE_SUBSCRIPTIONS.with(|subs| {
            subs.try_borrow().map(|s| s.clone()).unwrap_or_default()
        });
        if subscriptions.is_empty() {
            return;
        }

        tracing::info!("Resubscribing to {} tracked symbol(s)", subscriptions.len());
        for sub in subscriptions {
            Self::send_without_tracking(MessageOut::Subscribe(sub));
        }
    }

    /// The single teardown unsubscribe pass. Best-effort — the socket is
    /// about to close either way.
    fn unsubscribe_active() {
        let subscriptions = ACTIVE_SUBSCRIPTIONS.with(|subs| {
            subs.try_borrow().map(|s| s.clone()).unwrap_or_default()
        });
        for sub in subscriptions {
            Self::send_without_tracking(MessageOut::Unsubscribe(sub.to_unsubscribe()));
        }
    }

    fn send_without_tracking(message: MessageOut) {
        WS.with(|ws| {
            if let Ok(ws_ref) = ws.try_borrow() {
                if let Some(w) = ws_ref.as_ref() {
                    if ConnectionState::from_ws_ready_state(w.ready_state())
                        == ConnectionState::Open
                    {
                        if let Err(e) = w.send_with_str(&message.to_string()) {
                            tracing::warn!(
                                "Failed to send message ({}): {}",
                                message,
                                extract_js_error(&e)
                            );
                        }
                    }
                }
            }
        });
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn extract_js_error(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        let name = error
            .name()
            .as_string()
            .unwrap_or_else(|| "Error".to_string());
        let message = error.message().as_string().unwrap_or_default();

        if message.is_empty() {
            return name;
        }
        return format!("{}: {}", name, message);
    }

    if let Some(s) = err.as_string() {
        if !s.is_empty() {
            return s;
        }
    }

    if err.is_undefined() {
        return "undefined error".to_string();
    }
    if err.is_null() {
        return "null error".to_string();
    }

    "Unknown WebSocket error".to_string()
}
