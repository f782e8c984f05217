//! # parley-client
//!
//! Real-time chat session client. Owns one persistent WebSocket to a
//! conversational backend, keeps it alive across failures, and exposes a
//! single coherent "current bot turn" to the embedding application.
//!
//! Three pieces, composed bottom-up:
//!
//! - [`ConnectionController`]: one live connection, exponential-backoff
//!   reconnection, FIFO queuing while disconnected, intentional-close
//!   disambiguation
//! - the codec (in `parley-protocol`): pure encode/decode
//! - [`TurnAggregator`]: the thinking → tool-use → streaming →
//!   complete/error turn state machine
//!
//! [`ChatClient`] wires them together:
//!
//! ```text
//! let sink: MessageSink = Box::new(|msg| app_history.push(msg));
//! let client = ChatClient::new(config, Arc::new(BearerToken::new(token_fn)), sink);
//! client.send("hello", MessageId::from("1"), None);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod credential;
pub mod handlers;
pub mod turn;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

pub use config::ClientConfig;
pub use connection::{ConnectionController, ConnectionState};
pub use credential::{BearerToken, CredentialStrategy, SharedPin};
pub use handlers::{EventHandlers, HandlerSlot};
pub use turn::{MessageSink, TurnAggregator, TurnPhase};

use parley_core::{ChatMessage, ContentType, MessageId};
use parley_protocol::{OutboundAction, OutboundEnvelope};

/// The assembled chat session client.
///
/// Session identity is fixed at construction; changing sessions means
/// calling [`teardown`](Self::teardown) and building a new client.
pub struct ChatClient {
    config: ClientConfig,
    controller: ConnectionController,
    aggregator: Arc<TurnAggregator>,
    send_action: OutboundAction,
}

impl ChatClient {
    /// Build the client and start connecting. Must be called within a tokio
    /// runtime.
    ///
    /// Finished and failed messages are emitted through `sink`; the client
    /// persists nothing itself.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        strategy: Arc<dyn CredentialStrategy>,
        sink: MessageSink,
    ) -> Self {
        let aggregator = Arc::new(TurnAggregator::new(
            sink,
            Duration::from_millis(config.tool_settle_delay_ms),
        ));
        let handlers = HandlerSlot::new();
        handlers.rebind(aggregator.handlers());

        let send_action = strategy.send_action();
        let controller = ConnectionController::spawn(&config, strategy, handlers);

        Self {
            config,
            controller,
            aggregator,
            send_action,
        }
    }

    /// Send a plain chat message.
    ///
    /// Returns `false` (and emits nothing) when the session ID is unset or a
    /// turn is already in flight — at most one outstanding bot turn.
    pub fn send(
        &self,
        text: &str,
        client_message_id: MessageId,
        content_type: Option<ContentType>,
    ) -> bool {
        self.dispatch_send(text, client_message_id, content_type, self.send_action)
    }

    /// Send a planning-mode message with a generated message ID.
    pub fn send_planning_message(&self, text: &str) -> bool {
        self.dispatch_send(text, MessageId::new(), None, OutboundAction::SendPlanningMessage)
    }

    fn dispatch_send(
        &self,
        text: &str,
        client_message_id: MessageId,
        content_type: Option<ContentType>,
        action: OutboundAction,
    ) -> bool {
        if self.config.session_id.is_empty() {
            return false;
        }
        let user = ChatMessage::user(
            client_message_id.clone(),
            text,
            content_type.unwrap_or_default(),
        );
        if !self.aggregator.begin_turn(user) {
            return false;
        }

        let mut envelope = OutboundEnvelope::new(action, &self.config.session_id, text);
        envelope.message_id = Some(client_message_id.into_inner());
        envelope.content_type = content_type.map(|c| c.as_str().to_string());
        envelope.locale = self.config.locale.clone();
        self.controller.send(envelope);
        true
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.controller.state()
    }

    /// Whether the connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }

    /// Subscribe to connection state transitions.
    #[must_use]
    pub fn watch_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.controller.watch_state()
    }

    /// Current turn phase.
    #[must_use]
    pub fn turn_phase(&self) -> TurnPhase {
        self.aggregator.phase()
    }

    /// Close intentionally: no reconnection is scheduled and no further
    /// events are dispatched. Safe to call repeatedly; dropping the client
    /// has the same effect.
    pub fn teardown(&self) {
        self.controller.teardown();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use parley_core::SessionId;

    fn client_with_store(session: &str) -> (ChatClient, Arc<Mutex<Vec<ChatMessage>>>) {
        let store = Arc::new(Mutex::new(Vec::new()));
        let sink_store = Arc::clone(&store);
        let client = ChatClient::new(
            // Unresolvable endpoint: these tests only exercise the send gate
            ClientConfig::new("", SessionId::from(session)),
            Arc::new(SharedPin::none()),
            Box::new(move |msg| sink_store.lock().push(msg)),
        );
        (client, store)
    }

    #[tokio::test]
    async fn send_rejected_without_session() {
        let (client, store) = client_with_store("");
        assert!(!client.send("hi", MessageId::from("1"), None));
        assert!(store.lock().is_empty());
        assert_eq!(client.turn_phase(), TurnPhase::Idle);
    }

    #[tokio::test]
    async fn send_applies_back_pressure() {
        let (client, store) = client_with_store("s1");
        assert!(client.send("hi", MessageId::from("1"), None));
        assert_eq!(client.turn_phase(), TurnPhase::Thinking);
        assert!(!client.send("again", MessageId::from("3"), None));
        assert!(!client.send_planning_message("plan"));
        // Only the first send's pair was emitted
        assert_eq!(store.lock().len(), 2);
    }

    #[tokio::test]
    async fn teardown_is_idempotent() {
        let (client, _store) = client_with_store("s1");
        client.teardown();
        client.teardown();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }
}
