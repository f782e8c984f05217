//! Branded ID newtypes for type safety.
//!
//! The session and message identifiers are both opaque strings on the wire,
//! so each gets a distinct newtype to prevent passing one where the other is
//! expected. Generated IDs are UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

branded_id! {
    /// Identifies one chat session. Immutable for the life of a client.
    SessionId
}

branded_id! {
    /// Identifies one chat message (user- or bot-authored).
    MessageId
}

impl MessageId {
    /// Derive the placeholder bot-message ID from a user-message ID.
    ///
    /// Clients that number their messages get the numeric successor; opaque
    /// string IDs (and numeric IDs whose increment would overflow) gain a
    /// `.reply` suffix so the derivation stays total.
    #[must_use]
    pub fn successor(&self) -> Self {
        match self.0.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
            Some(next) => Self(next.to_string()),
            None => Self(format!("{}.reply", self.0)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
