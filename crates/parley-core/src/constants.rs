//! Wire-level and user-facing constants.

/// End-of-stream sentinel some backends append to the final chunk.
///
/// Trimmed from the accumulated content before a turn is finalized.
pub const STREAM_END_SENTINEL: &str = "[DONE]";

/// Structural marker that reclassifies a streaming turn as block content.
///
/// Once the accumulated buffer contains this marker the turn's content type
/// sticks to [`crate::ContentType::Blocks`] for the rest of the turn.
pub const BLOCK_RETURN_MARKER: &str = "<block-return>";

/// Fixed user-facing text emitted when a turn fails.
///
/// Used for backend `error` frames and for reconnect-budget exhaustion; the
/// raw error detail goes to the log, never to the message list.
pub const TURN_FAILURE_MESSAGE: &str =
    "Something went wrong while generating a response. Please try again.";

/// Default delay before a completed tool invocation reverts the turn display
/// back to the generic thinking state, in milliseconds.
pub const DEFAULT_TOOL_SETTLE_DELAY_MS: u64 = 1000;
