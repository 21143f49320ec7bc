//! In-memory cache backend implementation.

mod cache;

pub use cache::MemoryCache;
