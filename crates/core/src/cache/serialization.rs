//! Pure functions turning query results into cache bytes and back.
//!
//! Values are stored as JSON so a cached entry can be inspected while
//! debugging.

use serde::{de::DeserializeOwned, Serialize};

use super::{CacheError, Result};

/// Serializes a query result to JSON bytes.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes JSON bytes into a query result.
///
/// A shape mismatch (for example a cached row written by an older version
/// of the query) surfaces as [`CacheError::Serialization`].
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}
