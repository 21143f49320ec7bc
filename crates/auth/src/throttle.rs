//! Per-identifier login throttle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use clinica_core::auth::{
    attempt_state, record_failure, AttemptState, AuthError, LoginAttempt, ThrottlePolicy,
};

/// Failed-login counters keyed by normalized identifier.
///
/// Records are only ever evaluated lazily: an elapsed record is dropped the
/// next time its identifier is checked, or by [`LoginThrottle::purge_elapsed`].
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    policy: ThrottlePolicy,
    attempts: Arc<RwLock<HashMap<String, LoginAttempt>>>,
}

impl LoginThrottle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        &self.policy
    }

    /// Fails with `RateLimited` while `identifier` is blocked.
    pub async fn check(&self, identifier: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let state = {
            let attempts = self.attempts.read().await;
            attempt_state(attempts.get(identifier), now, &self.policy)
        };

        match state {
            AttemptState::Blocked { retry_after } => {
                // Round up so a client waiting exactly `retry_after_secs` is let in.
                let millis = retry_after.num_milliseconds().max(0) as u64;
                let retry_after_secs = millis.div_ceil(1000).max(1);
                Err(AuthError::RateLimited { retry_after_secs })
            }
            AttemptState::Clean => {
                self.discard_elapsed(identifier, now).await;
                Ok(())
            }
            AttemptState::Accumulating(_) => Ok(()),
        }
    }

    /// Records one more failure and returns the current count.
    pub async fn record_failure(&self, identifier: &str, now: DateTime<Utc>) -> u32 {
        let mut attempts = self.attempts.write().await;
        let updated = record_failure(attempts.remove(identifier), identifier, now, &self.policy);
        let count = updated.count;
        attempts.insert(identifier.to_string(), updated);
        count
    }

    /// Forgets every failure of `identifier`.
    pub async fn clear(&self, identifier: &str) {
        self.attempts.write().await.remove(identifier);
    }

    /// Current record of `identifier`, if any (elapsed or not).
    pub async fn attempt(&self, identifier: &str) -> Option<LoginAttempt> {
        self.attempts.read().await.get(identifier).cloned()
    }

    /// Drops every record whose window has elapsed, returning how many.
    pub async fn purge_elapsed(&self, now: DateTime<Utc>) -> usize {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|_, a| !a.window_elapsed(now, &self.policy));
        before - attempts.len()
    }

    async fn discard_elapsed(&self, identifier: &str, now: DateTime<Utc>) {
        let mut attempts = self.attempts.write().await;
        if attempts
            .get(identifier)
            .is_some_and(|a| a.window_elapsed(now, &self.policy))
        {
            attempts.remove(identifier);
        }
    }
}
