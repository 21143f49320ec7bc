//! In-memory storage backend.
//!
//! Stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. Data is not
//! persisted and will be lost when the process exits.

mod repository;

pub use repository::InMemoryRepository;
