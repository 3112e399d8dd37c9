//! Result submission: validate, then read-reconcile-write through a
//! [`StandingsStore`], retrying the whole unit on serialization conflicts.

use std::time::Duration;

use lgs_reconcile::{validate_scores, Reconciliation, Scores};
use lgs_schemas::{MatchView, TeamRow};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::{AppliedResult, StandingsStore, SubmitError};

/// A result submission as received from a caller. Fields are optional so
/// that adapters can pass through what they decoded and let validation
/// produce the `InvalidInput` answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub match_id: Option<i32>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl SubmitResult {
    pub fn new(match_id: i32, home_score: i32, away_score: i32) -> Self {
        Self {
            match_id: Some(match_id),
            home_score: Some(home_score),
            away_score: Some(away_score),
        }
    }

    /// Presence + score checks. Runs before any store access.
    pub fn validate(&self) -> Result<(i32, Scores), SubmitError> {
        let (Some(match_id), Some(home), Some(away)) =
            (self.match_id, self.home_score, self.away_score)
        else {
            return Err(SubmitError::InvalidInput(
                "Missing required fields".to_string(),
            ));
        };
        let scores = Scores::new(home, away);
        validate_scores(scores)?;
        Ok((match_id, scores))
    }
}

/// Bounded exponential backoff for [`SubmitError::ConflictRetry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 25,
            max_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// No retries: one attempt, no sleeping.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay before attempt `attempt + 1` (attempt is 1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Committed submission plus how many attempts it took.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub match_view: MatchView,
    pub home_team: TeamRow,
    pub away_team: TeamRow,
    pub reconciliation: Reconciliation,
    pub attempts: u32,
}

impl SubmitOutcome {
    fn from_applied(applied: AppliedResult, attempts: u32) -> Self {
        Self {
            match_view: applied.match_view,
            home_team: applied.home_team,
            away_team: applied.away_team,
            reconciliation: applied.reconciliation,
            attempts,
        }
    }
}

/// Submit a result for a match.
///
/// - `InvalidInput` is returned before the store is touched.
/// - `NotFound` and storage failures are returned as-is, never retried.
/// - `ConflictRetry` re-runs the entire read-reconcile-write unit, up to
///   `policy.max_attempts` in total.
pub async fn submit_result<S>(
    store: &S,
    req: &SubmitResult,
    policy: &RetryPolicy,
) -> Result<SubmitOutcome, SubmitError>
where
    S: StandingsStore + ?Sized,
{
    let (match_id, scores) = req.validate()?;
    let max_attempts = policy.max_attempts.max(1);

    let mut attempt = 1;
    loop {
        match store.apply_result(match_id, scores).await {
            Ok(applied) => {
                info!(
                    match_id,
                    home_score = scores.home,
                    away_score = scores.away,
                    attempt,
                    home_delta = ?applied.reconciliation.home,
                    away_delta = ?applied.reconciliation.away,
                    "match result recorded"
                );
                return Ok(SubmitOutcome::from_applied(applied, attempt));
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let wait = policy.backoff(attempt);
                let wait_ms = wait.as_millis() as u64;
                warn!(match_id, attempt, wait_ms, "conflict; retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                warn!(match_id, attempts = attempt, "conflict; retries exhausted");
                return Err(SubmitError::ConflictRetry { attempts: attempt });
            }
            Err(e) => {
                warn!(match_id, error = %e, "match result rejected");
                return Err(e);
            }
        }
    }
}
