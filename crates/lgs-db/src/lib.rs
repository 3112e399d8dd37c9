//! Postgres-backed team and match stores.
//!
//! - [`StandingsStore`] is the seam the daemon, the CLI and the tests talk to.
//! - [`PgStore`] implements it on Postgres; the read-reconcile-write of a
//!   result runs in one transaction with the match row locked.
//! - [`submit_result`] wraps a store with validation and bounded retry on
//!   serialization conflicts.
//!
//! Every query binds its inputs (`$1`, `$2`, ...). Nothing is interpolated.

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod pg;
mod store;
mod submit;

pub use pg::{
    apply_result, fetch_match_view, fetch_team, insert_match, insert_team, list_matches,
    list_teams, NewMatch, NewTeam, PgStore,
};
pub use store::{AppliedResult, StandingsStore, SubmitError};
pub use submit::{submit_result, RetryPolicy, SubmitOutcome, SubmitResult};

/// Env var the default config points `db.url_env` at.
pub const ENV_DB_URL: &str = "LGS_DATABASE_URL";

/// Connect to Postgres with an explicit URL and pool size.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (teams, matches): (bool, bool) = sqlx::query_as::<_, (bool, bool)>(
        r#"
        select
          exists (
            select 1 from information_schema.tables
            where table_schema = 'public' and table_name = 'teams'
          ),
          exists (
            select 1 from information_schema.tables
            where table_schema = 'public' and table_name = 'matches'
          )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_teams_table: teams,
        has_matches_table: matches,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_teams_table: bool,
    pub has_matches_table: bool,
}
