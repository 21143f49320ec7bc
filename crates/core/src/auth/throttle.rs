//! Fixed-window login throttling, as pure functions over [`LoginAttempt`].
//!
//! Per identifier: `Clean -> Accumulating -> Blocked`. Any state returns to
//! `Clean` after a successful login or once the block window has elapsed
//! since the last failure; an elapsed record is discarded, not reused.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Threshold and window of the login throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub block_window: Duration,
}

/// Failed-login bookkeeping for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub identifier: String,
    pub count: u32,
    pub first_attempt_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
}

/// Throttle state of an identifier at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Clean,
    Accumulating(u32),
    Blocked { retry_after: Duration },
}

impl LoginAttempt {
    /// Record for a first failure.
    pub fn first(identifier: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            count: 1,
            first_attempt_at: now,
            last_attempt_at: now,
        }
    }

    /// True once the block window has passed since the last failure.
    pub fn window_elapsed(&self, now: DateTime<Utc>, policy: &ThrottlePolicy) -> bool {
        now - self.last_attempt_at > policy.block_window
    }

    /// Time left until the window elapses, never negative.
    ///
    /// A window that ends past the representable range leaves the whole
    /// window to wait.
    pub fn retry_after(&self, now: DateTime<Utc>, policy: &ThrottlePolicy) -> Duration {
        let remaining = match self.last_attempt_at.checked_add_signed(policy.block_window) {
            Some(unblocked_at) => unblocked_at - now,
            None => policy.block_window,
        };
        remaining.max(Duration::zero())
    }
}

/// Evaluates the state of an identifier given its (possibly absent) record.
pub fn attempt_state(
    attempt: Option<&LoginAttempt>,
    now: DateTime<Utc>,
    policy: &ThrottlePolicy,
) -> AttemptState {
    match attempt {
        None => AttemptState::Clean,
        Some(a) if a.window_elapsed(now, policy) => AttemptState::Clean,
        Some(a) if a.count >= policy.max_attempts => AttemptState::Blocked {
            retry_after: a.retry_after(now, policy),
        },
        Some(a) => AttemptState::Accumulating(a.count),
    }
}

/// Returns the record after one more failure.
///
/// An elapsed record is replaced by a fresh one instead of being incremented.
pub fn record_failure(
    attempt: Option<LoginAttempt>,
    identifier: &str,
    now: DateTime<Utc>,
    policy: &ThrottlePolicy,
) -> LoginAttempt {
    match attempt {
        Some(mut a) if !a.window_elapsed(now, policy) => {
            a.count = a.count.saturating_add(1);
            a.last_attempt_at = now;
            a
        }
        _ => LoginAttempt::first(identifier, now),
    }
}
