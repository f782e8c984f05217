//! Reconnect policy and backoff calculation.
//!
//! Portable, sync-only building blocks: the connection controller in
//! `parley-client` applies these with tokio timers.

use serde::{Deserialize, Serialize};

/// Default maximum reconnection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Bounded exponential backoff policy for reconnection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectPolicy {
    /// Maximum number of reconnection attempts (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in ms (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given zero-based reconnection attempt.
    ///
    /// Formula: `base_delay_ms * 2^attempt`, saturating rather than
    /// overflowing for pathological attempt counts.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> u64 {
        self.base_delay_ms.saturating_mul(1u64 << attempt.min(31))
    }

    /// Whether the reconnection budget is spent.
    #[must_use]
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn policy_defaults() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_ms, 1000);
    }

    #[test]
    fn policy_serde_defaults() {
        let policy: ReconnectPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_ms, 1000);
    }

    // ── delay_for ────────────────────────────────────────────────────

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), 1000);
        assert_eq!(policy.delay_for(1), 2000);
        assert_eq!(policy.delay_for(2), 4000);
        assert_eq!(policy.delay_for(3), 8000);
        assert_eq!(policy.delay_for(4), 16_000);
    }

    #[test]
    fn delay_high_attempt_no_overflow() {
        let policy = ReconnectPolicy {
            max_attempts: 5,
            base_delay_ms: u64::MAX / 2,
        };
        // Must saturate, not panic
        assert_eq!(policy.delay_for(100), u64::MAX);
    }

    // ── is_exhausted ─────────────────────────────────────────────────

    #[test]
    fn exhaustion_boundary() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.is_exhausted(0));
        assert!(!policy.is_exhausted(4));
        assert!(policy.is_exhausted(5));
        assert!(policy.is_exhausted(6));
    }

    // ── properties ───────────────────────────────────────────────────

    proptest! {
        #[test]
        fn delay_matches_exponential_envelope(attempt in 0u32..20, base in 1u64..10_000) {
            let policy = ReconnectPolicy { max_attempts: 5, base_delay_ms: base };
            prop_assert_eq!(policy.delay_for(attempt), base * (1u64 << attempt));
        }

        #[test]
        fn delay_is_monotonic(attempt in 0u32..19) {
            let policy = ReconnectPolicy::default();
            prop_assert!(policy.delay_for(attempt + 1) > policy.delay_for(attempt));
        }

        #[test]
        fn exhaustion_iff_attempt_reaches_max(attempt in 0u32..100, max in 0u32..100) {
            let policy = ReconnectPolicy { max_attempts: max, base_delay_ms: 1 };
            prop_assert_eq!(policy.is_exhausted(attempt), attempt >= max);
        }
    }
}
