//! Session management for clinica.
//!
//! This crate provides:
//! - `SessionManager`: credential checks, opaque session tokens, inactivity
//!   expiry and fixed-window login throttling
//! - In-memory session, attempt and user stores
//! - Axum extractors and the `/auth/*` routes

mod config;
mod error;
mod extractors;
mod handlers;
mod manager;
mod sessions;
mod state;
mod throttle;
mod users;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{BearerToken, CurrentSession};
pub use handlers::auth_routes;
pub use manager::{PurgeReport, SessionManager};
pub use sessions::SessionStore;
pub use state::AuthState;
pub use throttle::LoginThrottle;
pub use users::InMemoryUserDirectory;
