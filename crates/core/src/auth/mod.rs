mod error;
mod functions;
mod password;
mod permissions;
mod throttle;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{
    generate_session_token, is_session_idle, normalize_identifier, token_display, TOKEN_LENGTH,
};
pub use password::{hash_password, verify_password, DEFAULT_COST};
pub use permissions::{permission, RolePermissions};
pub use throttle::{attempt_state, record_failure, AttemptState, LoginAttempt, ThrottlePolicy};
pub use traits::{Clock, Result, SessionRepository, SystemClock, UserDirectory};
pub use types::{Permissions, SessionRecord, SessionSummary, SessionToken, UserAccount};
