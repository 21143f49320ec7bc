//! Per-resource freshness table.
//!
//! Short TTLs for "today" aggregates, long ones for catalogs that rarely
//! change, and a medium default for everything else.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use super::QueryKey;

/// Errors produced while parsing a TTL table such as `"consultas=120,marcas=3600"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TtlParseError {
    #[error("missing '=' in TTL entry: {0}")]
    MissingSeparator(String),
    #[error("empty resource name in TTL entry: {0}")]
    EmptyName(String),
    #[error("invalid TTL seconds for '{name}': {value}")]
    InvalidSeconds { name: String, value: String },
    #[error("TTL for '{name}' exceeds {max_secs} seconds: {secs}")]
    TooLong {
        name: String,
        secs: u64,
        max_secs: u64,
    },
}

const MINUTE: u64 = 60;

/// Longest accepted TTL (one year).
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * MINUTE);

/// Built-in TTLs in seconds, keyed by group or by `"{group}_{query}"`.
const DEFAULT_TTLS: &[(&str, u64)] = &[
    ("hoy", MINUTE),
    ("consultas_hoy", MINUTE),
    ("consultas", 5 * MINUTE),
    ("pacientes", 5 * MINUTE),
    ("doctores", 10 * MINUTE),
    ("laboratorio", 5 * MINUTE),
    ("farmacia", 3 * MINUTE),
    ("gastos", 5 * MINUTE),
    ("reportes", 10 * MINUTE),
    ("especialidades", 30 * MINUTE),
    ("marcas", 30 * MINUTE),
    ("proveedores", 30 * MINUTE),
];

/// Maps resource names to TTLs, with a fallback for unknown names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlTable {
    default: Duration,
    entries: HashMap<String, Duration>,
}

impl TtlTable {
    /// Creates an empty table where every resource gets `default`.
    pub fn new(default: Duration) -> Self {
        Self {
            default,
            entries: HashMap::new(),
        }
    }

    /// Creates a table preloaded with the built-in TTLs.
    pub fn with_defaults(default: Duration) -> Self {
        let entries = DEFAULT_TTLS
            .iter()
            .map(|(name, secs)| (name.to_string(), Duration::from_secs(*secs)))
            .collect();
        Self { default, entries }
    }

    /// Sets the TTL for one resource.
    pub fn with(mut self, name: impl Into<String>, ttl: Duration) -> Self {
        self.entries.insert(name.into(), ttl);
        self
    }

    /// Overrides entries from a `name=secs,name=secs` list.
    pub fn merge_spec(&mut self, spec: &str) -> Result<(), TtlParseError> {
        for (name, ttl) in parse_ttl_spec(spec)? {
            self.entries.insert(name, ttl);
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        self.default
    }

    /// TTL for a resource name, falling back to the default.
    pub fn ttl_for(&self, name: &str) -> Duration {
        self.entries.get(name).copied().unwrap_or(self.default)
    }

    /// TTL for a query: `"{group}_{query}"` wins over `group`, then the default.
    pub fn ttl_for_key(&self, key: &QueryKey) -> Duration {
        let specific = format!("{}_{}", key.group(), key.query());
        self.entries
            .get(&specific)
            .or_else(|| self.entries.get(key.group()))
            .copied()
            .unwrap_or(self.default)
    }
}

/// Parses a `name=secs,name=secs` list. Blank items are ignored.
pub fn parse_ttl_spec(spec: &str) -> Result<Vec<(String, Duration)>, TtlParseError> {
    spec.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (name, value) = item
                .split_once('=')
                .ok_or_else(|| TtlParseError::MissingSeparator(item.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(TtlParseError::EmptyName(item.to_string()));
            }
            let secs: u64 = value.trim().parse().map_err(|_| TtlParseError::InvalidSeconds {
                name: name.to_string(),
                value: value.trim().to_string(),
            })?;
            if secs > MAX_TTL.as_secs() {
                return Err(TtlParseError::TooLong {
                    name: name.to_string(),
                    secs,
                    max_secs: MAX_TTL.as_secs(),
                });
            }
            Ok((name.to_string(), Duration::from_secs(secs)))
        })
        .collect()
}
