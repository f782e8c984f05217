//! Client configuration.

use serde::{Deserialize, Serialize};

use parley_core::constants::DEFAULT_TOOL_SETTLE_DELAY_MS;
use parley_core::{ReconnectPolicy, SessionId};

/// Configuration for one chat client instance.
///
/// Session identity (`endpoint`, `session_id`) is immutable for the life of
/// the client — changing it means tearing the client down and creating a new
/// one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// WebSocket endpoint base URL (`ws://` or `wss://`).
    pub endpoint: String,
    /// Session this client belongs to.
    pub session_id: SessionId,
    /// BCP 47 locale tag attached to outbound envelopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Reconnection policy.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    /// Settle delay before a completed tool reverts to thinking, in ms.
    #[serde(default = "default_tool_settle_delay_ms")]
    pub tool_settle_delay_ms: u64,
}

fn default_tool_settle_delay_ms() -> u64 {
    DEFAULT_TOOL_SETTLE_DELAY_MS
}

impl ClientConfig {
    /// Config with defaults for everything but the session identity.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            endpoint: endpoint.into(),
            session_id,
            locale: None,
            reconnect: ReconnectPolicy::default(),
            tool_settle_delay_ms: DEFAULT_TOOL_SETTLE_DELAY_MS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("wss://chat.example", SessionId::from("s1"));
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.base_delay_ms, 1000);
        assert_eq!(config.tool_settle_delay_ms, 1000);
        assert!(config.locale.is_none());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"endpoint":"wss://chat.example","sessionId":"s1"}"#,
        )
        .unwrap();
        assert_eq!(config.session_id, SessionId::from("s1"));
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.tool_settle_delay_ms, 1000);
    }

    #[test]
    fn config_locale_round_trips() {
        let mut config = ClientConfig::new("wss://x", SessionId::from("s1"));
        config.locale = Some("ko".into());
        let json = serde_json::to_string(&config).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.locale.as_deref(), Some("ko"));
    }
}
