//! lgs-daemon entry point.
//!
//! Sets up tracing, loads config, connects and migrates the database, wires
//! middleware, and starts the HTTP server. Route handlers live in
//! `routes.rs`; shared state types live in `state.rs`.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use lgs_config::{resolve_database_url, ServiceConfig};
use lgs_daemon::{routes, state};
use lgs_db::PgStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

/// Comma-separated list of layered YAML config files. Optional.
const ENV_CONFIG_PATHS: &str = "LGS_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let paths = config_paths_from_env();
    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let (cfg, loaded) = ServiceConfig::load(&path_refs)?;
    info!(config_hash = %loaded.config_hash, files = path_refs.len(), "config loaded");
    for pointer in lgs_config::unused_leaf_pointers(&loaded.config_json) {
        warn!(%pointer, "config key is not used");
    }

    let db_url = resolve_database_url(&cfg.db)?;
    let pool = lgs_db::connect(db_url.expose(), cfg.db.max_connections).await?;
    lgs_db::migrate(&pool).await?;

    let shared = Arc::new(state::AppState::new(
        Arc::new(PgStore::new(pool)),
        state::retry_policy_from(&cfg.submit),
    ));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(routes::cors_any_origin());

    let addr = cfg.daemon_addr()?;
    info!("lgs-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn config_paths_from_env() -> Vec<String> {
    std::env::var(ENV_CONFIG_PATHS)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("ctrl-c received; shutting down");
    }
}
