//! Connection controller — owns the one live WebSocket and keeps it alive.
//!
//! A single supervisor task is the sole owner of the socket, the FIFO
//! outbound queue, and the reconnect counter; the [`ConnectionController`]
//! handle talks to it over a command channel and observes state through a
//! watch channel. Single ownership makes the lifecycle invariants
//! structural: there is never more than one live connection, and a stale
//! socket is always dropped before a replacement is opened.
//!
//! Failure semantics:
//! - transport failures and abnormal closes retry with bounded exponential
//!   backoff; exhaustion is reported once via `on_error` and is terminal
//! - malformed inbound frames are logged and skipped, never fatal
//! - teardown marks the close as intentional: no reconnect is scheduled and
//!   no handler fires after the supervisor exits

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_core::{ClientError, ReconnectPolicy, SessionId};
use parley_protocol::{DecodeOutcome, OutboundEnvelope, build_connection_url, can_connect, decode_frame};

use crate::config::ClientConfig;
use crate::credential::CredentialStrategy;
use crate::handlers::HandlerSlot;

/// Lifecycle state of the managed connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection; a reconnect may be pending.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The connection is open.
    Connected,
    /// Reconnect budget exhausted; terminal for this instance.
    Error,
}

/// Handle to the supervisor task managing one connection.
pub struct ConnectionController {
    cmd_tx: mpsc::UnboundedSender<OutboundEnvelope>,
    state_rx: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl ConnectionController {
    /// Spawn the supervisor task. Must be called within a tokio runtime.
    ///
    /// If the endpoint or session ID is empty no connection is ever
    /// attempted; sends queue silently until teardown.
    #[must_use]
    pub fn spawn(
        config: &ClientConfig,
        strategy: Arc<dyn CredentialStrategy>,
        handlers: HandlerSlot,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();

        let supervisor = Supervisor {
            endpoint: config.endpoint.clone(),
            session_id: config.session_id.clone(),
            policy: config.reconnect.clone(),
            strategy,
            handlers,
            cmd_rx,
            state_tx,
            cancel: cancel.clone(),
            queue: VecDeque::new(),
        };
        let _ = tokio::spawn(supervisor.run());

        Self {
            cmd_tx,
            state_rx,
            cancel,
        }
    }

    /// Transmit an envelope, or queue it while no connection is open.
    pub fn send(&self, envelope: OutboundEnvelope) {
        if self.cmd_tx.send(envelope).is_err() {
            debug!("controller torn down; dropping outbound message");
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Whether the connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Intentional close: cancel any pending reconnect and close the live
    /// connection without scheduling a replacement. Safe to call repeatedly.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Why one serve cycle ended.
enum ServeExit {
    /// Intentional close; do not reconnect.
    Teardown,
    /// The connect attempt never opened.
    ConnectFailed,
    /// The connection opened, then closed or failed.
    ClosedAfterOpen,
}

/// The supervisor task: sole owner of socket, queue, and reconnect counter.
struct Supervisor {
    endpoint: String,
    session_id: SessionId,
    policy: ReconnectPolicy,
    strategy: Arc<dyn CredentialStrategy>,
    handlers: HandlerSlot,
    cmd_rx: mpsc::UnboundedReceiver<OutboundEnvelope>,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    queue: VecDeque<OutboundEnvelope>,
}

impl Supervisor {
    async fn run(mut self) {
        if !can_connect(&self.endpoint, &self.session_id) {
            debug!("endpoint or session unset; connection attempts disabled");
            self.queue_until_cancelled().await;
            return;
        }

        let mut attempt: u32 = 0;
        loop {
            self.set_state(ConnectionState::Connecting);
            match self.open_and_serve().await {
                ServeExit::Teardown => {
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
                ServeExit::ClosedAfterOpen => {
                    // Counter resets on every successful open, so backoff
                    // after a long-lived connection starts from the base.
                    attempt = 0;
                    self.set_state(ConnectionState::Disconnected);
                }
                ServeExit::ConnectFailed => {
                    self.set_state(ConnectionState::Disconnected);
                }
            }

            if self.policy.is_exhausted(attempt) {
                warn!(attempts = attempt, "reconnect budget exhausted");
                self.set_state(ConnectionState::Error);
                let error = ClientError::RetriesExhausted { attempts: attempt };
                self.handlers.dispatch_error(&error.to_string());
                self.queue_until_cancelled().await;
                return;
            }

            let delay_ms = self.policy.delay_for(attempt);
            attempt += 1;
            debug!(delay_ms, attempt, "scheduling reconnect");
            let delay = Duration::from_millis(delay_ms);
            if !self.backoff(delay).await {
                return;
            }
        }
    }

    /// One connect attempt plus, when it opens, the frame loop until close.
    async fn open_and_serve(&mut self) -> ServeExit {
        let credential = self.strategy.credential();
        let url = build_connection_url(
            &self.endpoint,
            &self.session_id,
            self.strategy.query_param(),
            credential.as_deref(),
        );

        let ws = tokio::select! {
            () = self.cancel.cancelled() => return ServeExit::Teardown,
            result = connect_async(&url) => match result {
                Ok((ws, _)) => ws,
                Err(e) => {
                    warn!(error = %e, "connect failed");
                    return ServeExit::ConnectFailed;
                }
            },
        };

        info!(session_id = %self.session_id, "connection open");
        self.set_state(ConnectionState::Connected);
        let (mut tx, mut rx) = ws.split();

        // Drain queued envelopes strictly in enqueue order before servicing
        // anything new; an unsent envelope goes back to the queue head so it
        // leads the next drain.
        while let Some(envelope) = self.queue.pop_front() {
            let wire = envelope.to_wire();
            if let Err(e) = tx.send(Message::Text(wire.into())).await {
                warn!(error = %e, "connection lost while draining queue");
                self.queue.push_front(envelope);
                return ServeExit::ClosedAfterOpen;
            }
        }

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    let _ = tx.send(Message::Close(None)).await;
                    info!("connection closed intentionally");
                    return ServeExit::Teardown;
                }
                cmd = self.cmd_rx.recv() => {
                    // A closed command channel means every controller handle
                    // is gone; treat it as teardown.
                    let Some(envelope) = cmd else { return ServeExit::Teardown };
                    let wire = envelope.to_wire();
                    if let Err(e) = tx.send(Message::Text(wire.into())).await {
                        warn!(error = %e, "send failed; connection closing");
                        self.queue.push_front(envelope);
                        return ServeExit::ClosedAfterOpen;
                    }
                }
                frame = rx.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.dispatch_frame(&text),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("connection closed by peer");
                        return ServeExit::ClosedAfterOpen;
                    }
                    // Ping/pong are answered by the transport; binary frames
                    // are not part of this protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        // A transport error and the close that follows are
                        // one exit; no double transition.
                        warn!(error = %e, "transport error");
                        return ServeExit::ClosedAfterOpen;
                    }
                }
            }
        }
    }

    fn dispatch_frame(&self, raw: &str) {
        match decode_frame(raw) {
            DecodeOutcome::Frame(frame) => self.handlers.dispatch(&frame),
            DecodeOutcome::Ignored => debug!("ignoring unrecognized frame"),
            DecodeOutcome::Malformed { context } => {
                warn!(%context, "skipping malformed frame");
            }
        }
    }

    /// Wait out the reconnect delay. Sends issued while waiting are queued
    /// in order. Returns `false` when cancelled.
    async fn backoff(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return false,
                () = &mut sleep => return true,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(envelope) => self.queue.push_back(envelope),
                    None => return false,
                },
            }
        }
    }

    /// Absorb sends without connecting (precondition unmet, or terminal
    /// error state) until teardown.
    async fn queue_until_cancelled(&mut self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(envelope) => self.queue.push_back(envelope),
                    None => return,
                },
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        if *self.state_tx.borrow() != state {
            debug!(?state, "connection state");
            let _ = self.state_tx.send(state);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
