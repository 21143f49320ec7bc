//! Cache backends and the query memoization layer.
//!
//! `MemoryCache` implements `clinica_core::cache::Cache`; `QueryCache` sits
//! on top of any backend and is what repositories use.

pub mod memory;
mod query;

pub use memory::MemoryCache;
pub use query::QueryCache;
