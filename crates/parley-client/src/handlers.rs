//! Rebindable event-handler slot.
//!
//! Decoded frames are routed to a set of callbacks held in a single shared
//! cell. The cell is read only at the moment of dispatch, so handlers
//! rebound mid-stream always see events through their latest registration —
//! an in-flight frame never invokes a stale closure.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use parley_protocol::{InboundFrame, ToolUpdate, TurnDone};

/// Callback invoked per text fragment.
pub type ChunkFn = Box<dyn Fn(&str) + Send + Sync>;
/// Callback invoked per tool lifecycle update.
pub type ToolFn = Box<dyn Fn(&ToolUpdate) + Send + Sync>;
/// Callback invoked on turn completion.
pub type CompleteFn = Box<dyn Fn(&TurnDone) + Send + Sync>;
/// Callback invoked on turn-fatal errors (backend or retry exhaustion).
pub type ErrorFn = Box<dyn Fn(&str) + Send + Sync>;

/// The callback set routed to by frame variant.
#[derive(Default)]
pub struct EventHandlers {
    /// Incremental text handler.
    pub on_chunk: Option<ChunkFn>,
    /// Tool lifecycle handler.
    pub on_tool: Option<ToolFn>,
    /// Turn completion handler.
    pub on_complete: Option<CompleteFn>,
    /// Error handler.
    pub on_error: Option<ErrorFn>,
}

/// Shared, rebindable handler cell.
#[derive(Clone, Default)]
pub struct HandlerSlot {
    inner: Arc<RwLock<EventHandlers>>,
}

impl HandlerSlot {
    /// Empty slot; frames are dropped until handlers are bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full callback set.
    pub fn rebind(&self, handlers: EventHandlers) {
        *self.inner.write() = handlers;
    }

    /// Route one decoded frame to the matching callback.
    pub fn dispatch(&self, frame: &InboundFrame) {
        let handlers = self.inner.read();
        match frame {
            InboundFrame::Chunk(chunk) => {
                if let Some(on_chunk) = &handlers.on_chunk {
                    on_chunk(&chunk.content);
                }
            }
            InboundFrame::Tool(tool) => {
                if let Some(on_tool) = &handlers.on_tool {
                    on_tool(tool);
                } else {
                    debug!(tool = %tool.tool_name, "no tool handler bound");
                }
            }
            InboundFrame::Done(done) => {
                if let Some(on_complete) = &handlers.on_complete {
                    on_complete(done);
                }
            }
            InboundFrame::Error(error) => {
                if let Some(on_error) = &handlers.on_error {
                    on_error(&error.message);
                }
            }
        }
    }

    /// Invoke the error handler directly (connection-level failures).
    pub fn dispatch_error(&self, message: &str) {
        if let Some(on_error) = &self.inner.read().on_error {
            on_error(message);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
