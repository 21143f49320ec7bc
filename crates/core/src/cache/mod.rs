mod error;
mod keys;
mod patterns;
mod serialization;
mod stats;
mod traits;
mod ttl;

pub use error::{CacheError, Result};
pub use keys::{group_pattern, groups, QueryKey};
pub use patterns::pattern_matches;
pub use serialization::{decode_value, encode_value};
pub use stats::CacheStats;
pub use traits::Cache;
pub use ttl::{parse_ttl_spec, TtlParseError, TtlTable, MAX_TTL};
