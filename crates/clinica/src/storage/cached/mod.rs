//! Cached repository decorators.
//!
//! The decorators implement read-through caching over a `QueryCache`:
//!
//! - **Reads**: memoized under a `QueryKey` of the repository's group
//! - **Writes**: persist to the repository, then invalidate the whole group
//!
//! # Example
//!
//! ```ignore
//! let cache = Arc::new(QueryCache::new(Arc::new(MemoryCache::new(capacity)), ttls));
//! let consultas = CachedConsultaRepository::new(Arc::new(InMemoryRepository::new()), cache);
//! ```

mod consultas;

pub use consultas::CachedConsultaRepository;
