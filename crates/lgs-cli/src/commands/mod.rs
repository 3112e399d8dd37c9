//! Command handler modules for lgs-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod standings;

use anyhow::Result;
use lgs_config::{resolve_database_url, ServiceConfig};
use lgs_db::RetryPolicy;
use sqlx::PgPool;

/// Load layered config (defaults when no paths), resolve the DB secret, and
/// connect.
pub async fn connect_with_config(config_paths: &[&str]) -> Result<(ServiceConfig, PgPool)> {
    let (cfg, _loaded) = ServiceConfig::load(config_paths)?;
    let url = resolve_database_url(&cfg.db)?;
    let pool = lgs_db::connect(url.expose(), cfg.db.max_connections).await?;
    Ok((cfg, pool))
}

pub async fn connect(config_paths: &[&str]) -> Result<PgPool> {
    Ok(connect_with_config(config_paths).await?.1)
}

pub fn retry_policy(cfg: &ServiceConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts: cfg.submit.max_attempts,
        base_delay_ms: cfg.submit.base_delay_ms,
        max_delay_ms: cfg.submit.max_delay_ms,
    }
}

/// `None` for an empty string, so `--conference ""` lists everything.
pub fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
