//! Credential strategies.
//!
//! The backend accepts two connection variants that differ only in how the
//! caller authenticates: shared-pin guests and bearer-token users. Instead
//! of two controllers, one [`CredentialStrategy`] seam parameterizes the
//! single connection state machine over how the credential is obtained,
//! which query parameter carries it, and which outbound action plain sends
//! use.

use parley_protocol::OutboundAction;

/// Pluggable policy for attaching authentication to a connection attempt.
pub trait CredentialStrategy: Send + Sync {
    /// Fetch the credential at connect time.
    ///
    /// Called once per connection attempt, so refreshed credentials are
    /// picked up on reconnect. `None` omits the parameter entirely.
    fn credential(&self) -> Option<String>;

    /// Query parameter name carrying the credential.
    fn query_param(&self) -> &'static str;

    /// Outbound action used for plain message sends.
    fn send_action(&self) -> OutboundAction {
        OutboundAction::SendMessage
    }
}

/// Shared-secret variant: guests join a session with a short pin.
pub struct SharedPin {
    pin: Option<String>,
}

impl SharedPin {
    /// Strategy with a fixed pin.
    #[must_use]
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: Some(pin.into()),
        }
    }

    /// Strategy for open sessions without a pin.
    #[must_use]
    pub fn none() -> Self {
        Self { pin: None }
    }
}

impl CredentialStrategy for SharedPin {
    fn credential(&self) -> Option<String> {
        self.pin.clone().filter(|p| !p.is_empty())
    }

    fn query_param(&self) -> &'static str {
        "pin"
    }
}

/// Bearer-token variant: the token source is consulted at each connect
/// attempt (the application owns acquisition and refresh).
pub struct BearerToken {
    source: Box<dyn Fn() -> Option<String> + Send + Sync>,
}

impl BearerToken {
    /// Strategy reading the token from the given source.
    #[must_use]
    pub fn new(source: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

impl CredentialStrategy for BearerToken {
    fn credential(&self) -> Option<String> {
        (self.source)().filter(|t| !t.is_empty())
    }

    fn query_param(&self) -> &'static str {
        "token"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
