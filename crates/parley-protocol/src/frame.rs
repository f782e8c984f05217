//! Inbound frame decoding.
//!
//! Each text frame received from the backend is a JSON object tagged by a
//! `type` discriminator. Decoding is total: non-JSON input and known-type
//! payloads with invalid fields report [`DecodeOutcome::Malformed`], while
//! objects with an unknown (or missing) `type` report
//! [`DecodeOutcome::Ignored`] so newer backends can add frame types without
//! breaking older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame `type` values this client understands.
const KNOWN_FRAME_TYPES: [&str; 4] = ["chunk", "tool", "done", "error"];

/// Lifecycle status of a tool invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// The tool is executing.
    Running,
    /// The tool finished.
    Complete,
}

/// Incremental text fragment of the current bot turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Text fragment to append.
    pub content: String,
}

/// Tool invocation lifecycle update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUpdate {
    /// Display name of the tool (may be empty on partial updates).
    pub tool_name: String,
    /// Invocation ID.
    pub tool_use_id: String,
    /// Lifecycle status.
    pub status: ToolStatus,
    /// Tool input, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Tool output, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Turn completion signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDone {
    /// Backend-declared content classification (may be empty).
    pub content_type: String,
    /// Whether the backend considers the turn complete.
    pub is_complete: bool,
    /// Backend-assigned final message ID (may be empty).
    pub message_id: String,
}

/// Turn-fatal error reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    /// Error text.
    pub message: String,
}

/// One decoded inbound frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// Incremental text fragment.
    Chunk(ChunkPayload),
    /// Tool invocation update.
    Tool(ToolUpdate),
    /// Turn completion.
    Done(TurnDone),
    /// Turn-fatal backend error.
    Error(BackendError),
}

/// Result of decoding one raw text frame.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeOutcome {
    /// A recognized frame.
    Frame(InboundFrame),
    /// Valid JSON with an unknown or missing `type`; skipped by policy.
    Ignored,
    /// Not decodable; logged and skipped, never fatal to the connection.
    Malformed {
        /// Parse error detail.
        context: String,
    },
}

/// Decode one raw text frame. Never panics.
#[must_use]
pub fn decode_frame(raw: &str) -> DecodeOutcome {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            return DecodeOutcome::Malformed {
                context: format!("invalid JSON: {e}"),
            };
        }
    };

    let Some(kind) = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
    else {
        return DecodeOutcome::Ignored;
    };
    if !KNOWN_FRAME_TYPES.contains(&kind.as_str()) {
        return DecodeOutcome::Ignored;
    }

    match serde_json::from_value::<InboundFrame>(value) {
        Ok(frame) => DecodeOutcome::Frame(frame),
        Err(e) => DecodeOutcome::Malformed {
            context: format!("invalid {kind} frame: {e}"),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn non_json_is_malformed() {
        assert_matches!(decode_frame("not json"), DecodeOutcome::Malformed { .. });
        assert_matches!(decode_frame(""), DecodeOutcome::Malformed { .. });
    }

    #[test]
    fn unknown_type_is_ignored() {
        assert_matches!(decode_frame(r#"{"type":"bogus"}"#), DecodeOutcome::Ignored);
    }

    #[test]
    fn missing_type_is_ignored() {
        assert_matches!(decode_frame(r#"{"content":"x"}"#), DecodeOutcome::Ignored);
    }

    #[test]
    fn known_type_with_bad_payload_is_malformed() {
        // chunk requires a string content field
        assert_matches!(
            decode_frame(r#"{"type":"chunk"}"#),
            DecodeOutcome::Malformed { .. }
        );
        assert_matches!(
            decode_frame(r#"{"type":"chunk","content":7}"#),
            DecodeOutcome::Malformed { .. }
        );
    }

    #[test]
    fn decodes_chunk() {
        let outcome = decode_frame(r#"{"type":"chunk","content":"x"}"#);
        assert_matches!(
            outcome,
            DecodeOutcome::Frame(InboundFrame::Chunk(ChunkPayload { content })) if content == "x"
        );
    }

    #[test]
    fn decodes_tool_with_optional_fields_absent() {
        let outcome = decode_frame(
            r#"{"type":"tool","toolName":"search","toolUseId":"t1","status":"running"}"#,
        );
        let DecodeOutcome::Frame(InboundFrame::Tool(tool)) = outcome else {
            panic!("expected tool frame, got {outcome:?}");
        };
        assert_eq!(tool.tool_name, "search");
        assert_eq!(tool.tool_use_id, "t1");
        assert_eq!(tool.status, ToolStatus::Running);
        assert!(tool.input.is_none());
        assert!(tool.output.is_none());
    }

    #[test]
    fn decodes_tool_complete_with_output() {
        let outcome = decode_frame(
            r#"{"type":"tool","toolName":"search","toolUseId":"t1","status":"complete","input":{"q":"rust"},"output":"ok"}"#,
        );
        let DecodeOutcome::Frame(InboundFrame::Tool(tool)) = outcome else {
            panic!("expected tool frame, got {outcome:?}");
        };
        assert_eq!(tool.status, ToolStatus::Complete);
        assert_eq!(tool.input.unwrap()["q"], "rust");
        assert_eq!(tool.output.as_deref(), Some("ok"));
    }

    #[test]
    fn decodes_done() {
        let outcome = decode_frame(
            r#"{"type":"done","contentType":"text","isComplete":true,"messageId":"9"}"#,
        );
        let DecodeOutcome::Frame(InboundFrame::Done(done)) = outcome else {
            panic!("expected done frame, got {outcome:?}");
        };
        assert_eq!(done.content_type, "text");
        assert!(done.is_complete);
        assert_eq!(done.message_id, "9");
    }

    #[test]
    fn decodes_error() {
        let outcome = decode_frame(r#"{"type":"error","message":"boom"}"#);
        assert_matches!(
            outcome,
            DecodeOutcome::Frame(InboundFrame::Error(BackendError { message })) if message == "boom"
        );
    }

    #[test]
    fn extra_fields_are_tolerated() {
        // Backends may add fields; decoding must not reject them
        let outcome = decode_frame(r#"{"type":"chunk","content":"x","seq":3}"#);
        assert_matches!(outcome, DecodeOutcome::Frame(InboundFrame::Chunk(_)));
    }
}
