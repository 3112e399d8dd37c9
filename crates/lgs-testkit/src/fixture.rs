use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTeam {
    pub name: String,
    pub city: String,
    pub emoji: String,
    pub conference: String,
    #[serde(default)]
    pub badge: Option<String>,
    pub display_order: i32,
}

/// Teams are referenced by their position in `LeagueFixture::teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureMatch {
    pub home: usize,
    pub away: usize,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueFixture {
    pub teams: Vec<FixtureTeam>,
    #[serde(default)]
    pub matches: Vec<FixtureMatch>,
}

pub fn parse_league_fixture(json: &str) -> Result<LeagueFixture> {
    let fx: LeagueFixture = serde_json::from_str(json).context("parse league fixture json")?;
    for (i, m) in fx.matches.iter().enumerate() {
        if m.home >= fx.teams.len() || m.away >= fx.teams.len() {
            anyhow::bail!("fixture match {i} references an unknown team index");
        }
        if m.home == m.away {
            anyhow::bail!("fixture match {i} has the same team on both sides");
        }
    }
    Ok(fx)
}

pub fn load_league_fixture_json(path: &str) -> Result<LeagueFixture> {
    let s = fs::read_to_string(path).with_context(|| format!("read fixture: {path}"))?;
    parse_league_fixture(&s)
}
