use std::time::Duration;

use clinica_core::auth::{ThrottlePolicy, DEFAULT_COST};

/// Session and throttle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Inactivity after which a session is no longer valid.
    pub session_timeout: Duration,
    /// Failed logins tolerated before an identifier is blocked.
    pub max_login_attempts: u32,
    /// How long a block lasts, measured from the last failure.
    pub login_block_window: Duration,
    /// bcrypt cost used for hashing (and for the dummy hash).
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(30 * 60),
            max_login_attempts: 5,
            login_block_window: Duration::from_secs(15 * 60),
            password_hash_cost: DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    pub fn session_timeout(&self) -> chrono::Duration {
        to_chrono(self.session_timeout)
    }

    pub fn throttle_policy(&self) -> ThrottlePolicy {
        ThrottlePolicy {
            max_attempts: self.max_login_attempts,
            block_window: to_chrono(self.login_block_window),
        }
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_clinic_policy() {
        let config = AuthConfig::default();

        assert_eq!(config.session_timeout(), chrono::Duration::minutes(30));
        assert_eq!(
            config.throttle_policy(),
            ThrottlePolicy {
                max_attempts: 5,
                block_window: chrono::Duration::minutes(15),
            }
        );
    }

    #[test]
    fn huge_durations_saturate() {
        let config = AuthConfig {
            session_timeout: Duration::MAX,
            ..AuthConfig::default()
        };
        assert_eq!(config.session_timeout(), chrono::Duration::MAX);
    }
}
