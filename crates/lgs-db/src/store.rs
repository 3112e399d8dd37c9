use async_trait::async_trait;
use lgs_reconcile::{ReconcileError, Reconciliation, Scores};
use lgs_schemas::{MatchFilter, MatchView, TeamFilter, TeamRow};

/// Team store + match store + query services behind one seam.
///
/// `apply_result` MUST execute read-previous, reconcile, apply deltas and
/// save-match as one all-or-nothing unit, serialized per match id. Team
/// counters MUST be changed by relative increments only.
#[async_trait]
pub trait StandingsStore: Send + Sync {
    /// Teams ordered by conference, points desc, wins desc, display order.
    async fn list_teams(&self, filter: &TeamFilter) -> anyhow::Result<Vec<TeamRow>>;

    /// Matches with team display data, ordered by date then time.
    async fn list_matches(&self, filter: &MatchFilter) -> anyhow::Result<Vec<MatchView>>;

    async fn fetch_team(&self, team_id: i32) -> anyhow::Result<Option<TeamRow>>;

    async fn fetch_match(&self, match_id: i32) -> anyhow::Result<Option<MatchView>>;

    /// Record `scores` as the result of `match_id`, replacing any previous
    /// result.
    async fn apply_result(&self, match_id: i32, scores: Scores)
        -> Result<AppliedResult, SubmitError>;
}

/// State after a committed result.
#[derive(Debug, Clone)]
pub struct AppliedResult {
    pub match_view: MatchView,
    pub home_team: TeamRow,
    pub away_team: TeamRow,
    pub reconciliation: Reconciliation,
}

/// Typed failure of a result submission. Any error leaves both the match row
/// and the team counters unchanged.
#[derive(Debug)]
pub enum SubmitError {
    /// Negative or tied scores, missing fields. Rejected before any write.
    InvalidInput(String),
    /// No match with this id.
    NotFound { match_id: i32 },
    /// Concurrent correction detected at the transaction boundary.
    ConflictRetry { attempts: u32 },
    /// Anything else from the storage layer.
    Storage(anyhow::Error),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::ConflictRetry { .. })
    }
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            SubmitError::NotFound { match_id } => write!(f, "match not found: id={match_id}"),
            SubmitError::ConflictRetry { attempts } => write!(
                f,
                "concurrent correction conflict; gave up after {attempts} attempt(s)"
            ),
            SubmitError::Storage(e) => write!(f, "storage failure: {e:#}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Storage(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<ReconcileError> for SubmitError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::InvalidInput { reason } => SubmitError::InvalidInput(reason),
        }
    }
}

impl From<anyhow::Error> for SubmitError {
    fn from(e: anyhow::Error) -> Self {
        SubmitError::Storage(e)
    }
}
