//! Outbound message envelopes.
//!
//! The serialization contract matters here: optional fields that are `None`
//! must be **absent** from the JSON object, not present-and-null — the
//! backend distinguishes a missing key from an empty one.

use serde::{Deserialize, Serialize};

use parley_core::SessionId;

/// Request action sent to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundAction {
    /// Plain chat message.
    #[default]
    #[serde(rename = "sendMessage")]
    SendMessage,
    /// Planning-mode message.
    #[serde(rename = "sendPlanningMessage")]
    SendPlanningMessage,
}

/// One outbound request to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope {
    /// Request action.
    pub action: OutboundAction,
    /// Session this request belongs to.
    pub session_id: String,
    /// Message body.
    pub message: String,
    /// Client-assigned message ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Content classification of the message body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// BCP 47 locale tag for the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl OutboundEnvelope {
    /// Build an envelope with only the required triple; optional fields are
    /// set afterwards by the caller when they have defined values.
    #[must_use]
    pub fn new(
        action: OutboundAction,
        session_id: &SessionId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action,
            session_id: session_id.as_str().to_string(),
            message: message.into(),
            message_id: None,
            content_type: None,
            locale: None,
        }
    }

    /// Serialize to the wire text frame.
    #[must_use]
    pub fn to_wire(&self) -> String {
        // Serialization of this struct cannot fail: every field is a plain
        // string or a unit-variant enum.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(envelope: &OutboundEnvelope) -> Vec<String> {
        let value = serde_json::to_value(envelope).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn minimal_envelope_has_exactly_the_required_triple() {
        let env = OutboundEnvelope::new(
            OutboundAction::SendMessage,
            &SessionId::from("s1"),
            "hello",
        );
        assert_eq!(keys(&env), vec!["action", "message", "sessionId"]);
    }

    #[test]
    fn locale_adds_exactly_one_key() {
        let mut env = OutboundEnvelope::new(
            OutboundAction::SendMessage,
            &SessionId::from("s1"),
            "hello",
        );
        env.locale = Some("ko".into());
        assert_eq!(keys(&env), vec!["action", "locale", "message", "sessionId"]);

        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["locale"], "ko");
        assert_eq!(value["message"], "hello");
    }

    #[test]
    fn action_serializes_to_wire_names() {
        let env = OutboundEnvelope::new(
            OutboundAction::SendPlanningMessage,
            &SessionId::from("s1"),
            "plan",
        );
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["action"], "sendPlanningMessage");
    }

    #[test]
    fn full_envelope_round_trips() {
        let mut env = OutboundEnvelope::new(
            OutboundAction::SendMessage,
            &SessionId::from("s1"),
            "hi",
        );
        env.message_id = Some("42".into());
        env.content_type = Some("text".into());
        env.locale = Some("en".into());

        let wire = env.to_wire();
        assert!(wire.contains("\"messageId\":\"42\""));
        let back: OutboundEnvelope = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, env);
    }
}
