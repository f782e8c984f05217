//! Error hierarchy for the Parley client.
//!
//! Built on [`thiserror`]. The taxonomy follows the failure-handling design:
//! transport failures are retried and only surfaced once the budget is
//! spent, decode failures are logged and skipped, and backend-reported
//! errors end the current turn but leave the connection open.

use thiserror::Error;

/// Top-level error type for the chat session client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect refused, abnormal close).
    #[error("transport failure: {context}")]
    Transport {
        /// What the transport was doing when it failed.
        context: String,
    },

    /// The reconnection budget is spent; the client is terminal.
    #[error("connection lost after {attempts} reconnect attempts")]
    RetriesExhausted {
        /// Total attempts made before giving up.
        attempts: u32,
    },

    /// An inbound frame could not be decoded.
    #[error("frame decode failure: {context}")]
    Decode {
        /// Parse error detail.
        context: String,
    },

    /// The backend reported a turn-fatal error.
    #[error("backend error: {message}")]
    Backend {
        /// Backend-supplied error text.
        message: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = ClientError::Transport {
            context: "connect refused".into(),
        };
        assert_eq!(err.to_string(), "transport failure: connect refused");

        let err = ClientError::RetriesExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "connection lost after 5 reconnect attempts");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
