//! Functional core of the clinica backend: cache keys and policies, session
//! and throttle arithmetic, repository traits. No I/O lives here.

#[cfg(feature = "auth")]
pub mod auth;
pub mod cache;
pub mod storage;
