//! Socket connection manager.
//!
//! Owns at most one WebSocket to the notification endpoint. `connect()` and
//! `disconnect()` never return errors; socket failures are logged and fed
//! into the reconnect policy instead. The connection loop is an explicit
//! state machine: Idle -> Connecting -> Open -> Closed, with Closed looping
//! back to Connecting only after an abnormal closure within the retry
//! budget.

use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::alerts::AlertSink;
use crate::cache::QueryCache;
use crate::session::SessionStore;

use super::dispatch::dispatch_frame;
use super::policy::ReconnectPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Everything the connection task needs, cloned out of the manager.
#[derive(Clone)]
struct ConnContext {
    ws_base: String,
    session: SessionStore,
    cache: QueryCache,
    alerts: AlertSink,
    policy: ReconnectPolicy,
    state_tx: Arc<watch::Sender<ConnectionState>>,
}

impl ConnContext {
    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }
}

/// Handle to a live (or reconnecting) connection task.
struct ConnHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct NotificationSocket {
    ctx: ConnContext,
    state_rx: watch::Receiver<ConnectionState>,
    conn: Mutex<Option<ConnHandle>>,
}

impl NotificationSocket {
    pub fn new(
        ws_base: impl Into<String>,
        session: SessionStore,
        cache: QueryCache,
        alerts: AlertSink,
    ) -> Self {
        Self::with_policy(ws_base, session, cache, alerts, ReconnectPolicy::default())
    }

    pub fn with_policy(
        ws_base: impl Into<String>,
        session: SessionStore,
        cache: QueryCache,
        alerts: AlertSink,
        policy: ReconnectPolicy,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        Self {
            ctx: ConnContext {
                ws_base: ws_base.into(),
                session,
                cache,
                alerts,
                policy,
                state_tx: Arc::new(state_tx),
            },
            state_rx,
            conn: Mutex::new(None),
        }
    }

    /// Open the socket. A no-op without a session token. Any previous
    /// connection (including a pending reconnect) is closed first, so there
    /// is never more than one socket per manager.
    pub fn connect(&self) {
        if self.ctx.session.access_token().is_none() {
            tracing::debug!("connect skipped: no session token");
            return;
        }

        self.teardown();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let task = tokio::spawn(run_connection(ctx, shutdown_rx));

        let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(ConnHandle { shutdown_tx, task });
    }

    /// Close the socket with a normal-closure code and cancel any pending
    /// reconnect timer. Never reconnects on its own afterwards.
    pub fn disconnect(&self) {
        self.teardown();
        self.ctx.set_state(ConnectionState::Idle);
    }

    fn teardown(&self) {
        let handle = {
            let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        if let Some(handle) = handle {
            // The task selects on this in every state: mid-handshake, while
            // reading, and while a reconnect timer is pending.
            let _ = handle.shutdown_tx.send(true);
            drop(handle.task);
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Watch state transitions (Idle/Connecting/Open/Closed).
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }
}

impl Drop for NotificationSocket {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Connection task ───────────────────────────────────────────

async fn run_connection(ctx: ConnContext, mut shutdown: watch::Receiver<bool>) {
    let mut attempt: u32 = 0;

    loop {
        // Re-read the token every attempt; a refresh may have rotated it,
        // and a cleared session means stop instead of dialing a dead token.
        let Some(token) = ctx.session.access_token() else {
            tracing::debug!("session gone, stopping notification socket");
            ctx.set_state(ConnectionState::Idle);
            return;
        };

        ctx.set_state(ConnectionState::Connecting);
        let url = format!(
            "{}/ws/notifications/?token={}",
            ctx.ws_base.trim_end_matches('/'),
            urlencoding::encode(&token)
        );

        let socket = tokio::select! {
            result = connect_async(&url) => match result {
                Ok((socket, _response)) => Some(socket),
                Err(e) => {
                    tracing::warn!(error = %e, "notification socket connect failed");
                    None
                }
            },
            _ = shutdown.changed() => return,
        };

        let mut normal_close = false;

        if let Some(mut socket) = socket {
            tracing::info!("notification socket connected");
            attempt = 0;
            ctx.set_state(ConnectionState::Open);

            loop {
                tokio::select! {
                    frame = socket.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let outcome = dispatch_frame(&text, &ctx.cache, &ctx.alerts);
                            tracing::trace!(?outcome, "frame dispatched");
                        }
                        Some(Ok(Message::Close(close))) => {
                            let code = close.as_ref().map(|f| f.code);
                            tracing::info!(?code, "notification socket closed by server");
                            if code == Some(CloseCode::Normal) {
                                normal_close = true;
                            }
                            break;
                        }
                        // Binary frames are not part of the protocol;
                        // ping/pong is handled by tungstenite.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "notification socket error");
                            break;
                        }
                        None => break,
                    },
                    _ = shutdown.changed() => {
                        let _ = socket
                            .send(Message::Close(Some(CloseFrame {
                                code: CloseCode::Normal,
                                reason: "user disconnected".into(),
                            })))
                            .await;
                        return;
                    }
                }
            }

            ctx.set_state(ConnectionState::Closed);
        } else {
            ctx.set_state(ConnectionState::Closed);
        }

        if normal_close {
            return;
        }

        match ctx.policy.delay_for(attempt) {
            None => {
                tracing::warn!(
                    attempts = ctx.policy.max_attempts,
                    "reconnect attempts exhausted, staying closed until the next connect()"
                );
                return;
            }
            Some(delay) => {
                attempt += 1;
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt,
                    "scheduling reconnect"
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => return,
                }
            }
        }
    }
}
