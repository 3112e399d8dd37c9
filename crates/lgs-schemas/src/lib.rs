//! Records shared between the stores, the daemon and the CLI.
//!
//! Shapes follow the public listing payloads. No business logic lives here.

use chrono::{NaiveDate, NaiveTime};
use lgs_reconcile::{MatchStatus, Standing, TeamDelta};
use serde::{Deserialize, Serialize};

/// A team with its current standings counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub emoji: String,
    pub conference: String,
    pub wins: i32,
    pub losses: i32,
    pub otl: i32,
    pub points: i32,
    pub badge: Option<String>,
}

impl TeamRow {
    pub fn standing(&self) -> Standing {
        Standing {
            wins: self.wins,
            losses: self.losses,
            otl: self.otl,
            points: self.points,
        }
    }

    /// Apply a delta the same way the team store increments its columns.
    pub fn apply_delta(&mut self, d: &TeamDelta) {
        self.wins += d.wins;
        self.losses += d.losses;
        self.otl += d.otl;
        self.points += d.points;
    }
}

/// Team display data embedded in a match listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: i32,
    pub name: String,
    pub emoji: String,
}

/// A match joined with each side's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub id: i32,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: MatchStatus,
}

/// Filter for team listings. `None` lists every conference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFilter {
    pub conference: Option<String>,
}

/// Filter for match listings. `None` lists every status; otherwise the
/// stored status text must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub status: Option<String>,
}
