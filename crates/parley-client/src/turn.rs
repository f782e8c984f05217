//! Turn aggregator — the single "current bot turn" state machine.
//!
//! Consumes the decoded event stream plus application-initiated sends and
//! maintains one [`TurnPhase`] per session, emitting finished (or failed)
//! messages through a caller-supplied sink. At most one turn is in flight:
//! a new send is rejected while any turn is active.
//!
//! Every phase change bumps an epoch counter. The settle-delay reversion
//! from tool-use back to thinking captures the epoch when it is scheduled
//! and applies only if nothing has advanced the turn since — a revert can
//! never overwrite progress made while it was waiting.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use parley_core::constants::{STREAM_END_SENTINEL, TURN_FAILURE_MESSAGE};
use parley_core::{ChatMessage, ContentType, MessageId};
use parley_protocol::{ToolStatus, ToolUpdate, TurnDone};

use crate::handlers::EventHandlers;

/// Where finished messages go. The client never persists anything itself;
/// the application appends emitted messages to its own history. A finished
/// bot message supersedes the pending placeholder emitted at turn start.
pub type MessageSink = Box<dyn Fn(ChatMessage) + Send + Sync>;

/// State of the current bot turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// No turn in flight; sends are accepted.
    Idle,
    /// Waiting for the backend to produce output.
    Thinking,
    /// A tool invocation is in progress or just finished.
    ToolUse {
        /// Display name of the active tool.
        tool_name: String,
        /// Lifecycle status.
        status: ToolStatus,
    },
    /// Text is streaming in.
    Streaming,
    /// The turn finished. Bookkeeping only: set and cleared inside a single
    /// event dispatch, so [`TurnAggregator::phase`] reads back [`Idle`](Self::Idle).
    Complete,
    /// The turn failed. Bookkeeping only, like [`Complete`](Self::Complete).
    Error,
}

/// Per-turn mutable state. Sole owner: the aggregator.
struct TurnInner {
    phase: TurnPhase,
    buffer: String,
    classification: ContentType,
    pending_id: Option<MessageId>,
    last_tool_name: Option<String>,
    epoch: u64,
}

impl TurnInner {
    fn advance(&mut self, phase: TurnPhase) {
        self.phase = phase;
        self.epoch += 1;
    }

    fn reset(&mut self) {
        self.advance(TurnPhase::Idle);
        self.buffer.clear();
        self.classification = ContentType::Text;
        self.pending_id = None;
        self.last_tool_name = None;
    }
}

/// Aggregates decoded events into one user-facing message lifecycle per turn.
pub struct TurnAggregator {
    inner: Arc<Mutex<TurnInner>>,
    sink: Arc<dyn Fn(ChatMessage) + Send + Sync>,
    settle_delay: Duration,
}

impl TurnAggregator {
    /// Build an aggregator emitting into the given sink.
    #[must_use]
    pub fn new(sink: MessageSink, settle_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TurnInner {
                phase: TurnPhase::Idle,
                buffer: String::new(),
                classification: ContentType::Text,
                pending_id: None,
                last_tool_name: None,
                epoch: 0,
            })),
            sink: Arc::from(sink),
            settle_delay,
        }
    }

    /// Current turn phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.inner.lock().phase.clone()
    }

    /// Start a turn for the given user message.
    ///
    /// Back-pressure: returns `false` without emitting anything while a turn
    /// is already active. On success emits the user message and a pending
    /// placeholder whose ID is the user ID's successor.
    pub fn begin_turn(&self, user: ChatMessage) -> bool {
        let placeholder = {
            let mut inner = self.inner.lock();
            if inner.phase != TurnPhase::Idle {
                debug!(phase = ?inner.phase, "send rejected; turn already active");
                return false;
            }
            let derived = user.id.successor();
            inner.pending_id = Some(derived.clone());
            inner.advance(TurnPhase::Thinking);
            ChatMessage::pending_bot(derived)
        };
        // Emit outside the lock: the sink may call back into the aggregator.
        (self.sink)(user);
        (self.sink)(placeholder);
        true
    }

    /// Handle an incremental text fragment.
    pub fn on_chunk(&self, content: &str) {
        let mut inner = self.inner.lock();
        match inner.phase {
            TurnPhase::Thinking | TurnPhase::ToolUse { .. } => {
                inner.advance(TurnPhase::Streaming);
            }
            TurnPhase::Streaming => {}
            _ => {
                debug!("chunk with no active turn; dropped");
                return;
            }
        }
        inner.buffer.push_str(content);
        inner.classification = inner.classification.classify(&inner.buffer);
    }

    /// Handle a tool lifecycle update.
    pub fn on_tool(&self, update: &ToolUpdate) {
        let mut inner = self.inner.lock();
        if inner.phase == TurnPhase::Idle {
            debug!("tool update with no active turn; dropped");
            return;
        }

        // Partial updates may omit the name; fall back to the last one seen.
        let display_name = if update.tool_name.is_empty() {
            inner.last_tool_name.clone().unwrap_or_default()
        } else {
            inner.last_tool_name = Some(update.tool_name.clone());
            update.tool_name.clone()
        };

        match update.status {
            ToolStatus::Running => {
                inner.advance(TurnPhase::ToolUse {
                    tool_name: display_name,
                    status: ToolStatus::Running,
                });
            }
            ToolStatus::Complete => {
                if !matches!(inner.phase, TurnPhase::ToolUse { .. }) {
                    // Already streaming (or beyond); nothing to settle.
                    return;
                }
                inner.advance(TurnPhase::ToolUse {
                    tool_name: display_name,
                    status: ToolStatus::Complete,
                });
                self.schedule_settle_revert(inner.epoch);
            }
        }
    }

    /// Handle the turn completion signal.
    pub fn on_complete(&self, done: &TurnDone) {
        let finished = {
            let mut inner = self.inner.lock();
            if inner.phase == TurnPhase::Idle {
                debug!("completion with no active turn; dropped");
                return;
            }
            inner.advance(TurnPhase::Complete);

            let content = finalize_content(&inner.buffer);
            let content_type = if done.content_type.is_empty() {
                inner.classification
            } else {
                ContentType::parse(&done.content_type)
            };
            let id = if done.message_id.is_empty() {
                inner.pending_id.take().unwrap_or_else(MessageId::new)
            } else {
                MessageId::from(done.message_id.as_str())
            };
            debug!(message_id = %id, is_complete = done.is_complete, "turn complete");

            inner.reset();
            ChatMessage::bot(id, content, content_type)
        };
        (self.sink)(finished);
    }

    /// Handle a turn-fatal error (backend `error` frame or reconnect
    /// exhaustion). Emits exactly one fixed failure message and resets.
    pub fn on_error(&self, message: &str) {
        {
            let mut inner = self.inner.lock();
            warn!(error = message, phase = ?inner.phase, "turn failed");
            inner.advance(TurnPhase::Error);
            inner.reset();
        }
        (self.sink)(ChatMessage::bot(
            MessageId::new(),
            TURN_FAILURE_MESSAGE,
            ContentType::Text,
        ));
    }

    /// Bind this aggregator's event methods into a handler set.
    #[must_use]
    pub fn handlers(self: &Arc<Self>) -> EventHandlers {
        let chunk = Arc::clone(self);
        let tool = Arc::clone(self);
        let complete = Arc::clone(self);
        let error = Arc::clone(self);
        EventHandlers {
            on_chunk: Some(Box::new(move |content| chunk.on_chunk(content))),
            on_tool: Some(Box::new(move |update| tool.on_tool(update))),
            on_complete: Some(Box::new(move |done| complete.on_complete(done))),
            on_error: Some(Box::new(move |message| error.on_error(message))),
        }
    }

    /// After the settle delay, revert tool-use back to thinking — unless the
    /// turn advanced in the meantime (the epoch check makes stale reverts
    /// no-ops, including ones scheduled before a newer tool event).
    fn schedule_settle_revert(&self, epoch: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = self.settle_delay;
        let _ = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.lock();
            if inner.epoch == epoch && matches!(inner.phase, TurnPhase::ToolUse { .. }) {
                inner.advance(TurnPhase::Thinking);
            }
        });
    }
}

/// Trim the end-of-stream sentinel (and surrounding whitespace) from the
/// accumulated buffer.
fn finalize_content(buffer: &str) -> String {
    let trimmed = buffer.trim_end();
    trimmed
        .strip_suffix(STREAM_END_SENTINEL)
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
