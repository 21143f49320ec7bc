use std::{env, fmt, num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clinica_auth::AuthConfig;
use clinica_core::auth::{RolePermissions, DEFAULT_COST};
use clinica_core::cache::{TtlParseError, TtlTable, MAX_TTL};
use thiserror::Error;

/// Longest accepted session timeout or login block window (ten years).
const MAX_AUTH_WINDOW: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Errors produced while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid CACHE_TTLS: {0}")]
    Ttl(#[from] TtlParseError),
}

/// How the application authenticates against the database server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// Operating-system (trusted) authentication.
    Integrated,
    /// Explicit user name and password.
    Password,
}

impl FromStr for CredentialMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integrated" => Ok(Self::Integrated),
            "password" => Ok(Self::Password),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integrated => write!(f, "integrated"),
            Self::Password => write!(f, "password"),
        }
    }
}

/// Connection settings for the clinic database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub server: String,
    pub name: String,
    pub auth_mode: CredentialMode,
}

/// Seed account for the in-memory user directory.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Per-resource cache TTLs (defaults merged with `CACHE_TTLS`)
    pub cache_ttls: TtlTable,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: NonZeroUsize,
    pub auth: AuthConfig,
    /// JSON file mapping role names to permissions (default: built-in roles)
    pub role_permissions_file: Option<PathBuf>,
    pub admin: Option<AdminAccount>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DB_SERVER` - Database server (default: "localhost")
    /// - `DB_NAME` - Database name (default: "clinica")
    /// - `DB_AUTH_MODE` - `integrated` or `password` (default: integrated)
    /// - `CACHE_DEFAULT_TTL_SECONDS` - TTL for resources without an entry (default: 300)
    /// - `CACHE_TTLS` - Overrides such as `consultas=120,marcas=3600`
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SESSION_TIMEOUT_SECONDS` - Session inactivity timeout (default: 1800)
    /// - `MAX_LOGIN_ATTEMPTS` - Failed logins before blocking (default: 5)
    /// - `LOGIN_BLOCK_SECONDS` - Block window (default: 900)
    /// - `PASSWORD_HASH_COST` - bcrypt cost (default: 12)
    /// - `ROLE_PERMISSIONS_FILE` - Role permission mapping (optional)
    /// - `ADMIN_EMAIL` / `ADMIN_PASSWORD_HASH` - Seed administrator (optional, both required)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            server: var("DB_SERVER").unwrap_or_else(|| "localhost".to_string()),
            name: var("DB_NAME").unwrap_or_else(|| "clinica".to_string()),
            auth_mode: parse_or(&var, "DB_AUTH_MODE", CredentialMode::Integrated)?,
        };

        let default_ttl = parse_secs_or(&var, "CACHE_DEFAULT_TTL_SECONDS", 300, MAX_TTL)?;
        let mut cache_ttls = TtlTable::with_defaults(default_ttl);
        if let Some(spec) = var("CACHE_TTLS") {
            cache_ttls.merge_spec(&spec)?;
        }

        let cache_max_entries = parse_or(
            &var,
            "CACHE_MAX_ENTRIES",
            NonZeroUsize::new(10_000).unwrap_or(NonZeroUsize::MIN),
        )?;

        let auth = AuthConfig {
            session_timeout: parse_secs_or(&var, "SESSION_TIMEOUT_SECONDS", 1800, MAX_AUTH_WINDOW)?,
            max_login_attempts: parse_or(&var, "MAX_LOGIN_ATTEMPTS", 5)?,
            login_block_window: parse_secs_or(&var, "LOGIN_BLOCK_SECONDS", 900, MAX_AUTH_WINDOW)?,
            password_hash_cost: parse_or(&var, "PASSWORD_HASH_COST", DEFAULT_COST)?,
        };

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD_HASH")) {
            (Some(email), Some(password_hash)) => Some(AdminAccount {
                email,
                password_hash,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    name: "ADMIN_PASSWORD_HASH",
                    value: "<missing>".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    name: "ADMIN_EMAIL",
                    value: "<missing>".to_string(),
                })
            }
        };

        Ok(Self {
            database,
            cache_ttls,
            cache_max_entries,
            auth,
            role_permissions_file: var("ROLE_PERMISSIONS_FILE").map(PathBuf::from),
            admin,
        })
    }

    /// Loads the role mapping from `ROLE_PERMISSIONS_FILE`, or the built-in one.
    pub fn load_role_permissions(&self) -> anyhow::Result<RolePermissions> {
        let Some(path) = &self.role_permissions_file else {
            return Ok(RolePermissions::builtin());
        };

        let json = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read role permissions {}: {}", path.display(), e)
        })?;
        let roles = RolePermissions::from_json(&json).map_err(|e| {
            anyhow::anyhow!("failed to parse role permissions {}: {}", path.display(), e)
        })?;
        Ok(roles)
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Whole seconds, at most `max`.
fn parse_secs_or<V>(
    var: &V,
    name: &'static str,
    default_secs: u64,
    max: Duration,
) -> Result<Duration, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(var, name, default_secs)?;
    if secs > max.as_secs() {
        return Err(ConfigError::Invalid {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
