use std::collections::BTreeMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use lgs_db::{AppliedResult, StandingsStore, SubmitError};
use lgs_reconcile::{reconcile, MatchState, Scores};
use lgs_schemas::{MatchFilter, MatchView, TeamFilter, TeamRef, TeamRow};
use tokio::sync::Mutex;

use crate::LeagueFixture;

#[derive(Debug, Clone)]
struct TeamRecord {
    row: TeamRow,
    display_order: i32,
}

#[derive(Debug, Clone)]
struct MatchRecord {
    state: MatchState,
    date: NaiveDate,
    time: NaiveTime,
}

#[derive(Debug, Default)]
struct Tables {
    teams: BTreeMap<i32, TeamRecord>,
    matches: BTreeMap<i32, MatchRecord>,
    next_team_id: i32,
    next_match_id: i32,
}

impl Tables {
    fn team_ref(&self, id: i32) -> anyhow::Result<TeamRef> {
        let t = self
            .teams
            .get(&id)
            .ok_or_else(|| anyhow!("dangling team reference {id}"))?;
        Ok(TeamRef {
            id,
            name: t.row.name.clone(),
            emoji: t.row.emoji.clone(),
        })
    }

    fn view(&self, id: i32, m: &MatchRecord) -> anyhow::Result<MatchView> {
        Ok(MatchView {
            id,
            home_team: self.team_ref(m.state.home_team_id)?,
            away_team: self.team_ref(m.state.away_team_id)?,
            home_score: m.state.home_score,
            away_score: m.state.away_score,
            date: m.date,
            time: m.time,
            status: m.state.status,
        })
    }
}

/// In-memory team + match store.
///
/// One mutex guards both tables, so `apply_result` is serialized and
/// all-or-nothing by construction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a fixture. Team ids are assigned 1.. in fixture order.
    pub async fn from_fixture(fx: &LeagueFixture) -> anyhow::Result<Self> {
        let store = Self::new();
        let mut ids = Vec::with_capacity(fx.teams.len());
        for t in &fx.teams {
            let id = store
                .add_team(&t.name, &t.city, &t.emoji, &t.conference, t.display_order)
                .await;
            if let Some(badge) = &t.badge {
                store.set_badge(id, badge).await?;
            }
            ids.push(id);
        }
        for m in &fx.matches {
            let (Some(&home), Some(&away)) = (ids.get(m.home), ids.get(m.away)) else {
                anyhow::bail!("fixture match references unknown team index");
            };
            store.add_match(home, away, m.date, m.time).await?;
        }
        Ok(store)
    }

    pub async fn add_team(
        &self,
        name: &str,
        city: &str,
        emoji: &str,
        conference: &str,
        display_order: i32,
    ) -> i32 {
        let mut t = self.tables.lock().await;
        t.next_team_id += 1;
        let id = t.next_team_id;
        t.teams.insert(
            id,
            TeamRecord {
                row: TeamRow {
                    id,
                    name: name.to_string(),
                    city: city.to_string(),
                    emoji: emoji.to_string(),
                    conference: conference.to_string(),
                    wins: 0,
                    losses: 0,
                    otl: 0,
                    points: 0,
                    badge: None,
                },
                display_order,
            },
        );
        id
    }

    pub async fn set_badge(&self, team_id: i32, badge: &str) -> anyhow::Result<()> {
        let mut t = self.tables.lock().await;
        let rec = t
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| anyhow!("unknown team {team_id}"))?;
        rec.row.badge = Some(badge.to_string());
        Ok(())
    }

    /// Add a scheduled match with no scores.
    pub async fn add_match(
        &self,
        home_team_id: i32,
        away_team_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<i32> {
        let mut t = self.tables.lock().await;
        if home_team_id == away_team_id {
            anyhow::bail!("a match needs two distinct teams");
        }
        for id in [home_team_id, away_team_id] {
            if !t.teams.contains_key(&id) {
                anyhow::bail!("unknown team {id}");
            }
        }
        t.next_match_id += 1;
        let id = t.next_match_id;
        t.matches.insert(
            id,
            MatchRecord {
                state: MatchState::scheduled(home_team_id, away_team_id),
                date,
                time,
            },
        );
        Ok(id)
    }

    /// Every team row, keyed by id (for invariant sweeps in tests).
    pub async fn team_rows(&self) -> Vec<TeamRow> {
        let t = self.tables.lock().await;
        t.teams.values().map(|r| r.row.clone()).collect()
    }

    /// Every stored match state, keyed by id.
    pub async fn match_states(&self) -> BTreeMap<i32, MatchState> {
        let t = self.tables.lock().await;
        t.matches
            .iter()
            .map(|(id, m)| (*id, m.state.clone()))
            .collect()
    }
}

#[async_trait]
impl StandingsStore for MemoryStore {
    async fn list_teams(&self, filter: &TeamFilter) -> anyhow::Result<Vec<TeamRow>> {
        let t = self.tables.lock().await;
        let mut recs: Vec<&TeamRecord> = t
            .teams
            .values()
            .filter(|r| match &filter.conference {
                Some(c) => &r.row.conference == c,
                None => true,
            })
            .collect();

        recs.sort_by(|a, b| {
            a.row
                .conference
                .cmp(&b.row.conference)
                .then(b.row.points.cmp(&a.row.points))
                .then(b.row.wins.cmp(&a.row.wins))
                .then(a.display_order.cmp(&b.display_order))
        });

        Ok(recs.into_iter().map(|r| r.row.clone()).collect())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> anyhow::Result<Vec<MatchView>> {
        let t = self.tables.lock().await;
        let mut out = Vec::new();
        for (id, m) in &t.matches {
            if let Some(s) = &filter.status {
                if m.state.status.as_str() != s {
                    continue;
                }
            }
            out.push(t.view(*id, m)?);
        }
        out.sort_by(|a, b| a.date.cmp(&b.date).then(a.time.cmp(&b.time)).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn fetch_team(&self, team_id: i32) -> anyhow::Result<Option<TeamRow>> {
        let t = self.tables.lock().await;
        Ok(t.teams.get(&team_id).map(|r| r.row.clone()))
    }

    async fn fetch_match(&self, match_id: i32) -> anyhow::Result<Option<MatchView>> {
        let t = self.tables.lock().await;
        t.matches
            .get(&match_id)
            .map(|m| t.view(match_id, m))
            .transpose()
    }

    async fn apply_result(
        &self,
        match_id: i32,
        scores: Scores,
    ) -> Result<AppliedResult, SubmitError> {
        let mut t = self.tables.lock().await;

        let previous = t
            .matches
            .get(&match_id)
            .map(|m| m.state.clone())
            .ok_or(SubmitError::NotFound { match_id })?;

        let rec = reconcile(&previous, scores)?;

        // Resolve both rows before touching either.
        let mut home = t
            .teams
            .get(&rec.home.team_id)
            .map(|r| r.row.clone())
            .ok_or_else(|| anyhow!("home team {} missing", rec.home.team_id))?;
        let mut away = t
            .teams
            .get(&rec.away.team_id)
            .map(|r| r.row.clone())
            .ok_or_else(|| anyhow!("away team {} missing", rec.away.team_id))?;
        home.apply_delta(&rec.home);
        away.apply_delta(&rec.away);

        for row in [&home, &away] {
            if let Some(r) = t.teams.get_mut(&row.id) {
                r.row = row.clone();
            }
        }
        if let Some(m) = t.matches.get_mut(&match_id) {
            m.state = rec.next.clone();
        }

        let match_view = {
            let m = t
                .matches
                .get(&match_id)
                .ok_or(SubmitError::NotFound { match_id })?;
            t.view(match_id, m)?
        };

        Ok(AppliedResult {
            match_view,
            home_team: home,
            away_team: away,
            reconciliation: rec,
        })
    }
}
