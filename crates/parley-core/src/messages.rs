//! Chat message model handed off to the embedding application.
//!
//! The aggregator emits [`ChatMessage`] values through a caller-supplied
//! sink: the user message and a pending placeholder when a turn starts, then
//! the finished (or failed) bot message when the turn ends. The client never
//! persists messages itself.

use serde::{Deserialize, Serialize};

use crate::constants::BLOCK_RETURN_MARKER;
use crate::ids::MessageId;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human participant.
    User,
    /// The conversational backend.
    Bot,
}

/// Classification of a message's content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain streamed text.
    #[default]
    Text,
    /// Structured block content (carries an embedded block-return marker).
    Blocks,
}

impl ContentType {
    /// Classify an accumulated buffer.
    ///
    /// The upgrade from [`Text`](Self::Text) to [`Blocks`](Self::Blocks) is
    /// one-way: callers pass their current classification and never see it
    /// downgraded, so the rich type sticks for the rest of a turn.
    #[must_use]
    pub fn classify(self, buffer: &str) -> Self {
        match self {
            Self::Blocks => Self::Blocks,
            Self::Text if buffer.contains(BLOCK_RETURN_MARKER) => Self::Blocks,
            Self::Text => Self::Text,
        }
    }

    /// Wire string for the outbound `contentType` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Blocks => "blocks",
        }
    }

    /// Parse a backend-declared content type string.
    ///
    /// Unknown values fall back to [`Text`](Self::Text).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "blocks" => Self::Blocks,
            _ => Self::Text,
        }
    }
}

/// One message in the conversation, as surfaced to the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID (client-assigned for user messages, backend-assigned or
    /// derived for bot messages).
    pub id: MessageId,
    /// Message author.
    pub sender: Sender,
    /// Message body.
    pub content: String,
    /// Content classification.
    pub content_type: ContentType,
    /// RFC 3339 creation timestamp.
    pub timestamp: String,
    /// Whether this is a placeholder for an in-flight bot turn.
    pub pending: bool,
}

impl ChatMessage {
    /// Build a user message.
    #[must_use]
    pub fn user(id: MessageId, content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id,
            sender: Sender::User,
            content: content.into(),
            content_type,
            timestamp: now_rfc3339(),
            pending: false,
        }
    }

    /// Build the pending placeholder for an in-flight bot turn.
    #[must_use]
    pub fn pending_bot(id: MessageId) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            content: String::new(),
            content_type: ContentType::Text,
            timestamp: now_rfc3339(),
            pending: true,
        }
    }

    /// Build a finished bot message.
    #[must_use]
    pub fn bot(id: MessageId, content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            content: content.into(),
            content_type,
            timestamp: now_rfc3339(),
            pending: false,
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
