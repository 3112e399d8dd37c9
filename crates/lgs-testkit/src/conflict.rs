use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use lgs_db::{AppliedResult, StandingsStore, SubmitError};
use lgs_reconcile::Scores;
use lgs_schemas::{MatchFilter, MatchView, TeamFilter, TeamRow};

/// Simulates serialization failures at the transaction boundary: the first
/// `conflicts` calls to `apply_result` fail with `ConflictRetry` before
/// reaching the inner store, so they have no effect.
pub struct ConflictInjector<S> {
    inner: S,
    remaining: AtomicU32,
    calls: AtomicU32,
}

impl<S> ConflictInjector<S> {
    pub fn new(inner: S, conflicts: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(conflicts),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of `apply_result` calls seen so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: StandingsStore> StandingsStore for ConflictInjector<S> {
    async fn list_teams(&self, filter: &TeamFilter) -> anyhow::Result<Vec<TeamRow>> {
        self.inner.list_teams(filter).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> anyhow::Result<Vec<MatchView>> {
        self.inner.list_matches(filter).await
    }

    async fn fetch_team(&self, team_id: i32) -> anyhow::Result<Option<TeamRow>> {
        self.inner.fetch_team(team_id).await
    }

    async fn fetch_match(&self, match_id: i32) -> anyhow::Result<Option<MatchView>> {
        self.inner.fetch_match(match_id).await
    }

    async fn apply_result(
        &self,
        match_id: i32,
        scores: Scores,
    ) -> Result<AppliedResult, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(SubmitError::ConflictRetry { attempts: 1 });
        }
        self.inner.apply_result(match_id, scores).await
    }
}
