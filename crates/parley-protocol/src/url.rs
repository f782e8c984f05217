//! Connection URL construction.

use std::fmt::Write as _;

use parley_core::SessionId;

/// Whether a connection attempt is even worth making.
///
/// Both the endpoint and the session ID must be non-empty; the controller
/// silently skips connecting otherwise (no state transition, no error).
#[must_use]
pub fn can_connect(base: &str, session_id: &SessionId) -> bool {
    !base.is_empty() && !session_id.is_empty()
}

/// Build the WebSocket connection URL.
///
/// Always appends `sessionId`; appends the credential parameter only when a
/// non-empty credential is supplied — an empty credential must not produce
/// an empty query parameter. Values are percent-escaped.
#[must_use]
pub fn build_connection_url(
    base: &str,
    session_id: &SessionId,
    credential_param: &str,
    credential: Option<&str>,
) -> String {
    let mut url = format!("{base}?sessionId={}", urlencoding::encode(session_id.as_str()));
    if let Some(cred) = credential.filter(|c| !c.is_empty()) {
        let _ = write!(url, "&{credential_param}={}", urlencoding::encode(cred));
    }
    url
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_credential() {
        let url = build_connection_url("wss://x", &SessionId::from("s1"), "token", None);
        assert_eq!(url, "wss://x?sessionId=s1");
    }

    #[test]
    fn url_with_token_credential() {
        let url = build_connection_url("wss://x", &SessionId::from("s1"), "token", Some("tok"));
        assert_eq!(url, "wss://x?sessionId=s1&token=tok");
    }

    #[test]
    fn url_with_pin_parameter_name() {
        let url = build_connection_url("wss://x", &SessionId::from("s1"), "pin", Some("1234"));
        assert!(url.contains("pin=1234"));
        assert!(!url.contains("token="));
    }

    #[test]
    fn url_escapes_session_id() {
        let url = build_connection_url("wss://x", &SessionId::from("a b&c=d"), "token", None);
        assert_eq!(url, "wss://x?sessionId=a%20b%26c%3Dd");
    }

    #[test]
    fn url_escapes_credential() {
        let url =
            build_connection_url("wss://x", &SessionId::from("s1"), "token", Some("a&b=c"));
        assert_eq!(url, "wss://x?sessionId=s1&token=a%26b%3Dc");
    }

    #[test]
    fn url_omits_empty_credential() {
        let url = build_connection_url("wss://x", &SessionId::from("s1"), "token", Some(""));
        assert_eq!(url, "wss://x?sessionId=s1");
    }

    // ── can_connect ──────────────────────────────────────────────────

    #[test]
    fn can_connect_requires_both_fields() {
        assert!(can_connect("wss://x", &SessionId::from("s1")));
        assert!(!can_connect("", &SessionId::from("s1")));
        assert!(!can_connect("wss://x", &SessionId::from("")));
        assert!(!can_connect("", &SessionId::from("")));
    }
}
