//! Standings queries and result submission.

use anyhow::Result;
use lgs_db::{submit_result, PgStore, StandingsStore, SubmitError, SubmitResult};
use lgs_schemas::{MatchFilter, MatchView, TeamFilter, TeamRow};

use super::{connect, connect_with_config, non_empty, retry_policy};

pub async fn teams(config_paths: &[&str], conference: Option<String>) -> Result<()> {
    let store = PgStore::new(connect(config_paths).await?);
    let filter = TeamFilter {
        conference: non_empty(conference),
    };
    let teams = store.list_teams(&filter).await?;

    println!("teams={}", teams.len());
    for t in &teams {
        print_team("team", t);
    }
    Ok(())
}

pub async fn matches(config_paths: &[&str], status: Option<String>) -> Result<()> {
    let store = PgStore::new(connect(config_paths).await?);
    let filter = MatchFilter {
        status: non_empty(status),
    };
    let matches = store.list_matches(&filter).await?;

    println!("matches={}", matches.len());
    for m in &matches {
        print_match(m);
    }
    Ok(())
}

pub async fn record_result(
    config_paths: &[&str],
    match_id: i32,
    home_score: i32,
    away_score: i32,
) -> Result<()> {
    let req = SubmitResult::new(match_id, home_score, away_score);
    // Reject bad scores before opening a connection.
    req.validate().map_err(cli_err)?;

    let (cfg, pool) = connect_with_config(config_paths).await?;
    let store = PgStore::new(pool);
    let out = submit_result(&store, &req, &retry_policy(&cfg))
        .await
        .map_err(cli_err)?;

    println!(
        "recorded=true match_id={} home_score={} away_score={} attempts={}",
        out.match_view.id, home_score, away_score, out.attempts
    );
    print_team("home_team", &out.home_team);
    print_team("away_team", &out.away_team);
    Ok(())
}

fn cli_err(e: SubmitError) -> anyhow::Error {
    match e {
        SubmitError::NotFound { match_id } => {
            anyhow::anyhow!("MATCH_NOT_FOUND: no match with id {match_id}")
        }
        SubmitError::InvalidInput(reason) => anyhow::anyhow!("INVALID_INPUT: {reason}"),
        e @ SubmitError::ConflictRetry { .. } => anyhow::Error::new(e).context("CONFLICT"),
        SubmitError::Storage(inner) => inner.context("submit result failed"),
    }
}

fn print_team(label: &str, t: &TeamRow) {
    println!(
        "{label} id={} name={:?} conference={:?} wins={} losses={} otl={} points={} badge={}",
        t.id,
        t.name,
        t.conference,
        t.wins,
        t.losses,
        t.otl,
        t.points,
        t.badge.as_deref().unwrap_or("NONE")
    );
}

fn print_match(m: &MatchView) {
    println!(
        "match id={} date={} time={} status={} home={:?} away={:?} score={}",
        m.id,
        m.date,
        m.time,
        m.status,
        m.home_team.name,
        m.away_team.name,
        score(m).unwrap_or_else(|| "NONE".to_string())
    );
}

fn score(m: &MatchView) -> Option<String> {
    Some(format!("{}-{}", m.home_score?, m.away_score?))
}
