use serde::{Deserialize, Serialize};

/// Standings points for a win.
pub const POINTS_PER_WIN: i32 = 2;
/// Standings points for an overtime loss. Regulation losses are worth 0.
pub const POINTS_PER_OTL: i32 = 1;

/// Match lifecycle status as stored by the match store.
///
/// Only `Finished` carries an aggregate effect; every other status is treated
/// as "nothing to reverse".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(MatchStatus::Scheduled),
            "in_progress" => Some(MatchStatus::InProgress),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    /// Lost by exactly one goal.
    Overtime,
    /// Lost by two or more goals.
    Regulation,
}

/// Decided result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Side,
    pub loss: LossKind,
}

impl Outcome {
    /// Classify a final score. Returns `None` for a tie.
    pub fn from_scores(home: i32, away: i32) -> Option<Self> {
        let (winner, margin) = if home > away {
            (Side::Home, home - away)
        } else if away > home {
            (Side::Away, away - home)
        } else {
            return None;
        };

        let loss = if margin == 1 {
            LossKind::Overtime
        } else {
            LossKind::Regulation
        };

        Some(Self { winner, loss })
    }
}

/// A submitted final score pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub home: i32,
    pub away: i32,
}

impl Scores {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }
}

/// Match fields the reconciler needs: team references, status, and the
/// currently stored scores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub home_team_id: i32,
    pub away_team_id: i32,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl MatchState {
    /// A freshly created match: scheduled, no scores.
    pub fn scheduled(home_team_id: i32, away_team_id: i32) -> Self {
        Self {
            home_team_id,
            away_team_id,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    /// Scores whose effect is currently applied to the standings, if any.
    ///
    /// A `finished` row with a missing score has no applied effect.
    pub fn applied_scores(&self) -> Option<Scores> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some(Scores::new(h, a)),
            _ => None,
        }
    }
}

/// Signed per-field adjustment for one team's aggregate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDelta {
    pub team_id: i32,
    pub wins: i32,
    pub losses: i32,
    pub otl: i32,
    pub points: i32,
}

impl TeamDelta {
    pub fn zero(team_id: i32) -> Self {
        Self {
            team_id,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.wins == 0 && self.losses == 0 && self.otl == 0 && self.points == 0
    }

    pub fn win(team_id: i32) -> Self {
        Self {
            team_id,
            wins: 1,
            points: POINTS_PER_WIN,
            ..Default::default()
        }
    }

    pub fn loss(team_id: i32, kind: LossKind) -> Self {
        match kind {
            LossKind::Overtime => Self {
                team_id,
                otl: 1,
                points: POINTS_PER_OTL,
                ..Default::default()
            },
            LossKind::Regulation => Self {
                team_id,
                losses: 1,
                ..Default::default()
            },
        }
    }

    /// Exact inverse of this delta (same team).
    pub fn negated(&self) -> Self {
        Self {
            team_id: self.team_id,
            wins: -self.wins,
            losses: -self.losses,
            otl: -self.otl,
            points: -self.points,
        }
    }

    /// Field-wise sum. Both deltas must target the same team.
    pub fn combined(&self, other: &TeamDelta) -> Self {
        debug_assert_eq!(self.team_id, other.team_id);
        Self {
            team_id: self.team_id,
            wins: self.wins + other.wins,
            losses: self.losses + other.losses,
            otl: self.otl + other.otl,
            points: self.points + other.points,
        }
    }
}

/// A team's aggregate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub wins: i32,
    pub losses: i32,
    pub otl: i32,
    pub points: i32,
}

impl Standing {
    /// Apply a delta as a relative increment, the same way the stores do.
    pub fn apply(&mut self, d: &TeamDelta) {
        self.wins += d.wins;
        self.losses += d.losses;
        self.otl += d.otl;
        self.points += d.points;
    }

    /// `points == 2*wins + otl`.
    pub fn points_invariant_holds(&self) -> bool {
        self.points == POINTS_PER_WIN * self.wins + POINTS_PER_OTL * self.otl
    }

    pub fn games_played(&self) -> i32 {
        self.wins + self.losses + self.otl
    }
}

/// Output of [`crate::reconcile`]: the combined deltas for both teams and the
/// match row to persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub home: TeamDelta,
    pub away: TeamDelta,
    pub next: MatchState,
}

impl Reconciliation {
    /// `true` when applying this reconciliation changes no team counters.
    pub fn is_noop_for_standings(&self) -> bool {
        self.home.is_zero() && self.away.is_zero()
    }
}

/// Rejection raised before any store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    InvalidInput { reason: String },
}

impl ReconcileError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ReconcileError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
        }
    }
}

impl std::error::Error for ReconcileError {}
