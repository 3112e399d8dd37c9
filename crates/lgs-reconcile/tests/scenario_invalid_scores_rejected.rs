//! Scenario: scores the standings model cannot represent are rejected with
//! `InvalidInput` and produce no deltas.

use lgs_reconcile::*;

fn is_invalid(r: Result<Reconciliation, ReconcileError>) -> bool {
    matches!(r, Err(ReconcileError::InvalidInput { .. }))
}

#[test]
fn tied_score_is_invalid_input() {
    let r = reconcile(&MatchState::scheduled(1, 2), Scores::new(2, 2));
    assert!(is_invalid(r));
}

#[test]
fn tied_correction_of_finished_match_is_invalid_input() {
    let prev = MatchState {
        home_team_id: 1,
        away_team_id: 2,
        status: MatchStatus::Finished,
        home_score: Some(3),
        away_score: Some(2),
    };
    assert!(is_invalid(reconcile(&prev, Scores::new(1, 1))));
}

#[test]
fn negative_scores_are_invalid_input() {
    assert!(is_invalid(reconcile(&MatchState::scheduled(1, 2), Scores::new(-1, 3))));
    assert!(is_invalid(reconcile(&MatchState::scheduled(1, 2), Scores::new(3, -1))));
}

#[test]
fn error_message_names_the_problem() {
    let err = reconcile(&MatchState::scheduled(1, 2), Scores::new(0, 0)).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("invalid input"), "{msg}");
    assert!(msg.contains("0-0"), "{msg}");
}
