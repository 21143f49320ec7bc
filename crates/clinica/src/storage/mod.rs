//! Repository implementations.
//!
//! - `inmemory`: `ConsultaRepository` over HashMaps, the backend the binary runs on
//! - `cached`: read-through decorators that invalidate their cache group on writes

pub mod cached;
pub mod inmemory;
