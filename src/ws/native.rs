//! Native stream client — `tokio-tungstenite`.
//!
//! A background tokio task owns the connection lifecycle:
//! - heartbeat ping while open (send failures swallowed)
//! - exponential backoff reconnection with jitter
//! - subscription tracking + auto-resubscribe on reconnect
//! - pending-message queue while disconnected
//! - single best-effort unsubscribe pass at teardown
//!
//! The public `WsClient` talks to the task over mpsc channels and exposes
//! decoded quotes as a stream of [`WsEvent`]s.

use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::quote;
use crate::error::WsError;
use crate::shared::Symbol;
use crate::ws::backoff::Backoff;
use crate::ws::subscriptions::{track_subscription, SubscribeParams};
use crate::ws::{ConnectionState, MessageOut, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Send(MessageOut),
    /// Liveness check (page became visible): retry now if not open.
    Nudge,
    Disconnect,
}

enum DisconnectReason {
    UserRequested,
    TransportLost,
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: WsConfig,
    event_tx: mpsc::Sender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    active_subscriptions: Vec<SubscribeParams>,
    pending_messages: Vec<MessageOut>,
    backoff: Backoff,
    state: Arc<AtomicU8>,
}

impl TaskState {
    fn emit(&self, event: WsEvent) {
        let _ = self.event_tx.try_send(event);
    }

    fn store(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native stream client using `tokio-tungstenite`.
///
/// Owns the single connection to the quote gateway. Construct once, call
/// [`WsClient::connect`], fold [`WsClient::events`] into a
/// [`QuoteBook`](crate::domain::quote::QuoteBook), and call
/// [`WsClient::disconnect`] when done.
pub struct WsClient {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
    event_tx: mpsc::Sender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    state: Arc<AtomicU8>,
}

impl WsClient {
    /// Create a new stream client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected as u8)),
        }
    }

    /// Spawn the background task and start connecting.
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        self.cmd_tx = Some(cmd_tx);
        self.state
            .store(ConnectionState::Connecting as u8, Ordering::SeqCst);

        let state = TaskState {
            backoff: Backoff::from_config(&self.config),
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            active_subscriptions: Vec::new(),
            pending_messages: Vec::new(),
            state: Arc::clone(&self.state),
        };

        let handle = tokio::spawn(run_task(state));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Tear down the connection.
    ///
    /// Suppresses all future auto-reconnects, cancels pending timers,
    /// sends one best-effort unsubscribe per tracked symbol, and closes
    /// the transport. Safe to call any number of times.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        self.state
            .store(ConnectionState::Disconnected as u8, Ordering::SeqCst);
        Ok(())
    }

    /// Send a control frame.
    ///
    /// While disconnected with the task alive, subscribe/unsubscribe
    /// frames are queued and flushed on the next open; without a task the
    /// call is a logged no-op returning [`WsError::NotConnected`].
    pub fn send(&self, msg: MessageOut) -> Result<(), WsError> {
        match &self.cmd_tx {
            Some(tx) => tx.try_send(Command::Send(msg)).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    WsError::SendFailed("Command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => WsError::NotConnected,
            }),
            None => {
                tracing::warn!("Cannot send — stream client not started");
                Err(WsError::NotConnected)
            }
        }
    }

    /// Start real-time quotes for a consumer ticker.
    ///
    /// The ticker is translated to its wire symbol before subscribing.
    pub fn subscribe(&self, symbol: &Symbol) -> Result<(), WsError> {
        self.send(MessageOut::subscribe(symbol.to_wire()))
    }

    /// Stop real-time quotes for a consumer ticker.
    pub fn unsubscribe(&self, symbol: &Symbol) -> Result<(), WsError> {
        self.send(MessageOut::unsubscribe(symbol.to_wire()))
    }

    /// Switch the watched ticker: unsubscribe the previous one (if any and
    /// different), then subscribe the next.
    pub fn watch(&self, previous: Option<&Symbol>, next: &Symbol) -> Result<(), WsError> {
        if let Some(prev) = previous {
            if prev == next {
                return Ok(());
            }
            self.unsubscribe(prev)?;
        }
        self.subscribe(next)
    }

    /// Liveness check for visibility recovery.
    ///
    /// Call when the hosting page returns to the foreground: if the
    /// transport is not open, a reconnect fires immediately, bypassing any
    /// backoff wait. A no-op after teardown.
    pub fn notify_visible(&self) {
        if self.state() == ConnectionState::Open {
            return;
        }
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.try_send(Command::Nudge);
        }
    }

    /// Whether the transport is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.state.load(Ordering::SeqCst))
    }

    /// Stream of events from the connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped before
    /// calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        state.store(ConnectionState::Connecting);
        let (sink, stream) = match attempt_connect(&state.config.url).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!("WebSocket connection failed: {}", e);
                state.store(ConnectionState::Disconnected);

                if state.config.reconnect && backoff_sleep(&mut state).await {
                    continue;
                }
                return;
            }
        };

        // ── 2. Connected ─────────────────────────────────────────────────
        state.backoff.reset();
        state.store(ConnectionState::Open);
        state.emit(WsEvent::Connected);

        // ── 3. Flush pending messages and resubscribe ────────────────────
        let mut sink = sink;
        flush_pending(&mut sink, &mut state.pending_messages).await;
        resubscribe_all(&mut sink, &state.active_subscriptions).await;

        // ── 4. Inner select! loop ────────────────────────────────────────
        let reason = run_connected(&mut state, sink, stream).await;

        // ── 5. Post-disconnect decision ──────────────────────────────────
        state.store(ConnectionState::Disconnected);

        match reason {
            DisconnectReason::UserRequested => return,
            DisconnectReason::TransportLost => {
                if state.config.reconnect && backoff_sleep(&mut state).await {
                    continue;
                }
                return;
            }
        }
    }
}

/// The inner connected loop — runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    let heartbeat = Duration::from_millis(u64::from(state.config.heartbeat_interval_ms));
    let mut heartbeat_interval = tokio::time::interval(heartbeat);
    heartbeat_interval.reset(); // skip the immediate first tick

    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match quote::decode_with(text.as_ref(), &state.config.decode) {
                            Ok(record) => state.emit(WsEvent::Quote(record)),
                            Err(e) => {
                                // Control acks and malformed frames land here;
                                // both are dropped without surfacing.
                                tracing::trace!("Dropping frame: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        state.emit(WsEvent::Disconnected {
                            code: Some(code),
                            reason,
                        });
                        return DisconnectReason::TransportLost;
                    }
                    Some(Ok(_)) => {} // Binary, Frame — ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        state.emit(WsEvent::Disconnected { code: None, reason });
                        return DisconnectReason::TransportLost;
                    }
                    None => {
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: "Stream ended".into(),
                        });
                        return DisconnectReason::TransportLost;
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(msg)) => {
                        track_subscription(&mut state.active_subscriptions, &msg);
                        if let Err(e) = send_msg(&mut sink, &msg).await {
                            tracing::warn!("Send failed: {}", e);
                        }
                    }
                    Some(Command::Nudge) => {} // already connected
                    Some(Command::Disconnect) => {
                        state.store(ConnectionState::Closing);
                        unsubscribe_all(&mut sink, &state.active_subscriptions).await;
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                    None => {
                        // WsClient dropped — clean exit
                        return DisconnectReason::UserRequested;
                    }
                }
            }

            // ── c) Heartbeat ─────────────────────────────────────────────
            _ = heartbeat_interval.tick() => {
                if let Err(e) = send_msg(&mut sink, &MessageOut::ping()).await {
                    tracing::warn!("Failed to send heartbeat: {}", e);
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Establish a WebSocket connection with a 30-second timeout.
async fn attempt_connect(
    url: &str,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(Duration::from_secs(30), connect_async(url))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Serialize and send a MessageOut over the sink.
async fn send_msg(
    sink: &mut SplitSink<WsStream, Message>,
    msg: &MessageOut,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

async fn resubscribe_all(sink: &mut SplitSink<WsStream, Message>, subs: &[SubscribeParams]) {
    if subs.is_empty() {
        return;
    }
    tracing::info!("Resubscribing to {} tracked symbol(s)", subs.len());
    for sub in subs {
        let msg = MessageOut::Subscribe(sub.clone());
        if let Err(e) = send_msg(sink, &msg).await {
            tracing::warn!("Failed to resubscribe: {}", e);
        }
    }
}

/// The single teardown unsubscribe pass. Best-effort — the connection is
/// about to close either way.
async fn unsubscribe_all(sink: &mut SplitSink<WsStream, Message>, subs: &[SubscribeParams]) {
    for sub in subs {
        let msg = MessageOut::Unsubscribe(sub.to_unsubscribe());
        if let Err(e) = send_msg(sink, &msg).await {
            tracing::debug!("Teardown unsubscribe failed: {}", e);
        }
    }
}

// ─── Message queue ───────────────────────────────────────────────────────────

async fn flush_pending(sink: &mut SplitSink<WsStream, Message>, pending: &mut Vec<MessageOut>) {
    if pending.is_empty() {
        return;
    }
    tracing::info!("Flushing {} pending message(s)", pending.len());
    let messages = std::mem::take(pending);
    for msg in &messages {
        if let Err(e) = send_msg(sink, msg).await {
            tracing::warn!("Failed to flush pending message: {}", e);
        }
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

/// Sleep out the next backoff delay. Returns `false` when teardown arrived
/// mid-wait (the scheduled reconnect is cancelled); a `Nudge` — the page
/// became visible — ends the wait early for an immediate retry.
async fn backoff_sleep(state: &mut TaskState) -> bool {
    let delay = state.backoff.next_delay();
    tracing::info!(
        "Reconnect attempt {} in {}ms",
        state.backoff.attempts(),
        delay.as_millis()
    );

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return true,
            cmd = state.cmd_rx.recv() => match cmd {
                Some(Command::Send(msg)) => {
                    track_subscription(&mut state.active_subscriptions, &msg);
                    if !matches!(msg, MessageOut::Ping) {
                        state.pending_messages.push(msg);
                    }
                }
                Some(Command::Nudge) => {
                    tracing::info!("Page visible — retrying connection now");
                    return true;
                }
                Some(Command::Disconnect) | None => return false,
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
