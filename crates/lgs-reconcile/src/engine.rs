use crate::{
    MatchState, MatchStatus, Outcome, ReconcileError, Reconciliation, Scores, Side, TeamDelta,
};

/// Reject scores the standings model cannot represent.
///
/// - negative score on either side
/// - tie (no draw in the win / OT-loss / regulation-loss model)
pub fn validate_scores(scores: Scores) -> Result<Outcome, ReconcileError> {
    if scores.home < 0 || scores.away < 0 {
        return Err(ReconcileError::invalid(format!(
            "scores must be non-negative (home={}, away={})",
            scores.home, scores.away
        )));
    }
    Outcome::from_scores(scores.home, scores.away).ok_or_else(|| {
        ReconcileError::invalid(format!(
            "tied result {}-{} cannot be recorded",
            scores.home, scores.away
        ))
    })
}

/// Forward delta of one outcome, returned as (home, away).
pub fn outcome_delta(
    outcome: Outcome,
    home_team_id: i32,
    away_team_id: i32,
) -> (TeamDelta, TeamDelta) {
    match outcome.winner {
        Side::Home => (
            TeamDelta::win(home_team_id),
            TeamDelta::loss(away_team_id, outcome.loss),
        ),
        Side::Away => (
            TeamDelta::loss(home_team_id, outcome.loss),
            TeamDelta::win(away_team_id),
        ),
    }
}

/// Inverse of whatever `previous` currently contributes to the standings.
///
/// Zero when the match was never finished, when a finished row is missing a
/// score, or when the stored result is a tie (nothing was ever applied for it).
fn reversal(previous: &MatchState) -> (TeamDelta, TeamDelta) {
    let zero = (
        TeamDelta::zero(previous.home_team_id),
        TeamDelta::zero(previous.away_team_id),
    );

    let Some(applied) = previous.applied_scores() else {
        return zero;
    };
    let Some(outcome) = Outcome::from_scores(applied.home, applied.away) else {
        return zero;
    };

    let (home, away) = outcome_delta(outcome, previous.home_team_id, previous.away_team_id);
    (home.negated(), away.negated())
}

/// Two-pass reconciliation of a result submission:
/// 1) reverse the previously applied outcome (if any)
/// 2) apply the outcome of `new_scores`
///
/// Returns per-team combined deltas plus the match row to persist. Applying
/// the deltas as relative increments keeps `points == 2*wins + otl` for both
/// teams, and the aggregate effect equals "undo old, apply new" no matter how
/// many times the match is corrected.
pub fn reconcile(
    previous: &MatchState,
    new_scores: Scores,
) -> Result<Reconciliation, ReconcileError> {
    let outcome = validate_scores(new_scores)?;

    let (undo_home, undo_away) = reversal(previous);
    let (do_home, do_away) = outcome_delta(outcome, previous.home_team_id, previous.away_team_id);

    Ok(Reconciliation {
        home: undo_home.combined(&do_home),
        away: undo_away.combined(&do_away),
        next: MatchState {
            home_team_id: previous.home_team_id,
            away_team_id: previous.away_team_id,
            status: MatchStatus::Finished,
            home_score: Some(new_scores.home),
            away_score: Some(new_scores.away),
        },
    })
}
