//! Runtime secret resolution.
//!
//! Config YAML stores only the env var NAME of the database URL
//! (`/db/url_env`). Binaries resolve it once at startup and pass the result
//! into the store constructor. Error messages name the variable, never the
//! value, and `Debug` output is redacted.

use anyhow::{bail, Result};

use crate::DbConfig;

/// A resolved Postgres connection string.
#[derive(Clone)]
pub struct DatabaseUrl {
    /// Env var the value was read from.
    pub source_env: String,
    url: String,
}

impl DatabaseUrl {
    pub fn expose(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseUrl")
            .field("source_env", &self.source_env)
            .field("url", &"<REDACTED>")
            .finish()
    }
}

/// Read the connection string named by `db.url_env`.
pub fn resolve_database_url(db: &DbConfig) -> Result<DatabaseUrl> {
    resolve_database_url_with(db, |name| std::env::var(name).ok())
}

/// Same as [`resolve_database_url`] with an injectable env lookup.
pub fn resolve_database_url_with<F>(db: &DbConfig, lookup: F) -> Result<DatabaseUrl>
where
    F: Fn(&str) -> Option<String>,
{
    let name = db.url_env.trim();
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(DatabaseUrl {
            source_env: name.to_string(),
            url: v.trim().to_string(),
        }),
        _ => bail!("SECRET_MISSING: env var {name} is not set or empty"),
    }
}

/// `true` for `postgres://` / `postgresql://` URLs, which carry credentials
/// and therefore must not appear as config literals.
pub fn is_connection_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("postgres://") || lower.starts_with("postgresql://")
}
