use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use lgs_reconcile::{reconcile, MatchState, MatchStatus, Scores, TeamDelta};
use lgs_schemas::{MatchFilter, MatchView, TeamFilter, TeamRef, TeamRow};
use sqlx::postgres::PgRow;
use sqlx::{Executor, PgConnection, PgPool, Postgres, Row};
use tracing::debug;

use crate::store::{AppliedResult, StandingsStore, SubmitError};

/// [`StandingsStore`] on a Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StandingsStore for PgStore {
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<TeamRow>> {
        list_teams(&self.pool, filter).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchView>> {
        list_matches(&self.pool, filter).await
    }

    async fn fetch_team(&self, team_id: i32) -> Result<Option<TeamRow>> {
        fetch_team(&self.pool, team_id).await
    }

    async fn fetch_match(&self, match_id: i32) -> Result<Option<MatchView>> {
        fetch_match_view(&self.pool, match_id).await
    }

    async fn apply_result(
        &self,
        match_id: i32,
        scores: Scores,
    ) -> Result<AppliedResult, SubmitError> {
        apply_result(&self.pool, match_id, scores).await
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub city: String,
    pub emoji: String,
    pub conference: String,
    pub badge: Option<String>,
    pub display_order: i32,
}

/// Insert a team with zeroed counters. Returns its id.
pub async fn insert_team(pool: &PgPool, team: &NewTeam) -> Result<i32> {
    let (id,): (i32,) = sqlx::query_as::<_, (i32,)>(
        r#"
        insert into teams (name, city, emoji, conference, badge, display_order)
        values ($1, $2, $3, $4, $5, $6)
        returning id
        "#,
    )
    .bind(&team.name)
    .bind(&team.city)
    .bind(&team.emoji)
    .bind(&team.conference)
    .bind(&team.badge)
    .bind(team.display_order)
    .fetch_one(pool)
    .await
    .context("insert_team failed")?;

    Ok(id)
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub home_team_id: i32,
    pub away_team_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Insert a scheduled match with no scores. Returns its id.
pub async fn insert_match(pool: &PgPool, m: &NewMatch) -> Result<i32> {
    let (id,): (i32,) = sqlx::query_as::<_, (i32,)>(
        r#"
        insert into matches (home_team_id, away_team_id, match_date, match_time, status)
        values ($1, $2, $3, $4, 'scheduled')
        returning id
        "#,
    )
    .bind(m.home_team_id)
    .bind(m.away_team_id)
    .bind(m.date)
    .bind(m.time)
    .fetch_one(pool)
    .await
    .context("insert_match failed")?;

    Ok(id)
}

// ---------------------------------------------------------------------------
// Query services
// ---------------------------------------------------------------------------

/// Filtering by conference makes the conference sort key constant, so one
/// ORDER BY serves both the full and the filtered listing.
pub async fn list_teams(pool: &PgPool, filter: &TeamFilter) -> Result<Vec<TeamRow>> {
    let rows = sqlx::query(
        r#"
        select id, name, city, emoji, conference, wins, losses, otl, points, badge
        from teams
        where ($1::text is null or conference = $1)
        order by conference, points desc, wins desc, display_order
        "#,
    )
    .bind(filter.conference.as_deref())
    .fetch_all(pool)
    .await
    .context("list_teams failed")?;

    rows.iter().map(team_from_row).collect()
}

pub async fn list_matches(pool: &PgPool, filter: &MatchFilter) -> Result<Vec<MatchView>> {
    let rows = sqlx::query(
        r#"
        select
          m.id,
          m.home_team_id, ht.name as home_name, ht.emoji as home_emoji,
          m.away_team_id, at.name as away_name, at.emoji as away_emoji,
          m.home_score, m.away_score,
          m.match_date, m.match_time, m.status
        from matches m
        join teams ht on m.home_team_id = ht.id
        join teams at on m.away_team_id = at.id
        where ($1::text is null or m.status = $1)
        order by m.match_date, m.match_time, m.id
        "#,
    )
    .bind(filter.status.as_deref())
    .fetch_all(pool)
    .await
    .context("list_matches failed")?;

    rows.iter().map(match_view_from_row).collect()
}

pub async fn fetch_team<'e, E>(exec: E, team_id: i32) -> Result<Option<TeamRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        select id, name, city, emoji, conference, wins, losses, otl, points, badge
        from teams
        where id = $1
        "#,
    )
    .bind(team_id)
    .fetch_optional(exec)
    .await
    .context("fetch_team failed")?;

    row.as_ref().map(team_from_row).transpose()
}

pub async fn fetch_match_view<'e, E>(exec: E, match_id: i32) -> Result<Option<MatchView>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        select
          m.id,
          m.home_team_id, ht.name as home_name, ht.emoji as home_emoji,
          m.away_team_id, at.name as away_name, at.emoji as away_emoji,
          m.home_score, m.away_score,
          m.match_date, m.match_time, m.status
        from matches m
        join teams ht on m.home_team_id = ht.id
        join teams at on m.away_team_id = at.id
        where m.id = $1
        "#,
    )
    .bind(match_id)
    .fetch_optional(exec)
    .await
    .context("fetch_match_view failed")?;

    row.as_ref().map(match_view_from_row).transpose()
}

fn team_from_row(row: &PgRow) -> Result<TeamRow> {
    Ok(TeamRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        emoji: row.try_get("emoji")?,
        conference: row.try_get("conference")?,
        wins: row.try_get("wins")?,
        losses: row.try_get("losses")?,
        otl: row.try_get("otl")?,
        points: row.try_get("points")?,
        badge: row.try_get("badge")?,
    })
}

fn match_view_from_row(row: &PgRow) -> Result<MatchView> {
    Ok(MatchView {
        id: row.try_get("id")?,
        home_team: TeamRef {
            id: row.try_get("home_team_id")?,
            name: row.try_get("home_name")?,
            emoji: row.try_get("home_emoji")?,
        },
        away_team: TeamRef {
            id: row.try_get("away_team_id")?,
            name: row.try_get("away_name")?,
            emoji: row.try_get("away_emoji")?,
        },
        home_score: row.try_get("home_score")?,
        away_score: row.try_get("away_score")?,
        date: row.try_get("match_date")?,
        time: row.try_get("match_time")?,
        status: parse_status(&row.try_get::<String, _>("status")?)?,
    })
}

fn parse_status(s: &str) -> Result<MatchStatus> {
    MatchStatus::parse(s).ok_or_else(|| anyhow!("invalid match status in store: {s}"))
}

// ---------------------------------------------------------------------------
// Result application (read -> reconcile -> write, one transaction)
// ---------------------------------------------------------------------------

/// Apply a result under a row lock on the match.
///
/// `select ... for update` serializes corrections of the same match: a second
/// writer blocks until the first commits and then reads the committed scores
/// as its "previous" state. Team counters are bumped with relative updates in
/// ascending team id order so two matches sharing teams lock them in the same
/// order. Returning early drops `tx`, which rolls back.
pub async fn apply_result(
    pool: &PgPool,
    match_id: i32,
    scores: Scores,
) -> Result<AppliedResult, SubmitError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| storage_err(e, "begin tx failed"))?;

    let row = sqlx::query(
        r#"
        select home_team_id, away_team_id, home_score, away_score, status
        from matches
        where id = $1
        for update
        "#,
    )
    .bind(match_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| storage_err(e, "lock match row failed"))?;

    let Some(row) = row else {
        return Err(SubmitError::NotFound { match_id });
    };

    let previous = MatchState {
        home_team_id: row.try_get("home_team_id").map_err(decode_err)?,
        away_team_id: row.try_get("away_team_id").map_err(decode_err)?,
        home_score: row.try_get("home_score").map_err(decode_err)?,
        away_score: row.try_get("away_score").map_err(decode_err)?,
        status: parse_status(&row.try_get::<String, _>("status").map_err(decode_err)?)?,
    };

    let rec = reconcile(&previous, scores)?;
    debug!(
        match_id,
        prev_status = %previous.status,
        home_delta = ?rec.home,
        away_delta = ?rec.away,
        "reconciled result"
    );

    let mut deltas = [rec.home, rec.away];
    deltas.sort_by_key(|d| d.team_id);
    for d in &deltas {
        apply_team_delta(&mut *tx, d).await?;
    }

    sqlx::query(
        r#"
        update matches
        set home_score = $2,
            away_score = $3,
            status = $4
        where id = $1
        "#,
    )
    .bind(match_id)
    .bind(rec.next.home_score)
    .bind(rec.next.away_score)
    .bind(rec.next.status.as_str())
    .execute(&mut *tx)
    .await
    .map_err(|e| storage_err(e, "save match failed"))?;

    let match_view = fetch_match_view(&mut *tx, match_id)
        .await?
        .ok_or(SubmitError::NotFound { match_id })?;
    let home_team = fetch_team(&mut *tx, previous.home_team_id)
        .await?
        .ok_or_else(|| anyhow!("home team {} vanished", previous.home_team_id))?;
    let away_team = fetch_team(&mut *tx, previous.away_team_id)
        .await?
        .ok_or_else(|| anyhow!("away team {} vanished", previous.away_team_id))?;

    tx.commit()
        .await
        .map_err(|e| storage_err(e, "commit failed"))?;

    Ok(AppliedResult {
        match_view,
        home_team,
        away_team,
        reconciliation: rec,
    })
}

/// Relative increment; a zero delta still touches the row so the lock order
/// stays the same for every result.
async fn apply_team_delta(conn: &mut PgConnection, d: &TeamDelta) -> Result<(), SubmitError> {
    let res = sqlx::query(
        r#"
        update teams
        set wins = wins + $2,
            losses = losses + $3,
            otl = otl + $4,
            points = points + $5
        where id = $1
        "#,
    )
    .bind(d.team_id)
    .bind(d.wins)
    .bind(d.losses)
    .bind(d.otl)
    .bind(d.points)
    .execute(conn)
    .await
    .map_err(|e| storage_err(e, "apply team delta failed"))?;

    if res.rows_affected() != 1 {
        return Err(SubmitError::Storage(anyhow!(
            "apply team delta: team {} not found",
            d.team_id
        )));
    }
    Ok(())
}

fn storage_err(e: sqlx::Error, what: &'static str) -> SubmitError {
    if is_serialization_failure(&e) {
        return SubmitError::ConflictRetry { attempts: 1 };
    }
    SubmitError::Storage(anyhow::Error::new(e).context(what))
}

fn decode_err(e: sqlx::Error) -> SubmitError {
    SubmitError::Storage(anyhow::Error::new(e).context("decode match row failed"))
}

/// Postgres serialization_failure (40001) or deadlock_detected (40P01).
fn is_serialization_failure(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}
