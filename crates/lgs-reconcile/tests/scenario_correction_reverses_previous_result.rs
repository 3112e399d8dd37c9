//! Scenario: correcting a finished result reverses it exactly before applying
//! the new one.
//!
//! GREEN when:
//! - 3-2 corrected to 1-4 yields the combined deltas of "undo OT win, apply
//!   regulation away win".
//! - Resubmitting identical scores is a net-zero change.
//! - Any correction ends with the same standings as if the corrected score had
//!   been the first submission.

use lgs_reconcile::*;

const HOME: i32 = 1;
const AWAY: i32 = 2;

fn finished(home: i32, away: i32) -> MatchState {
    MatchState {
        home_team_id: HOME,
        away_team_id: AWAY,
        status: MatchStatus::Finished,
        home_score: Some(home),
        away_score: Some(away),
    }
}

/// Apply one reconciliation to a pair of standings, as a store would.
fn apply(r: &Reconciliation, home: &mut Standing, away: &mut Standing) {
    home.apply(&r.home);
    away.apply(&r.away);
}

#[test]
fn correcting_ot_home_win_to_regulation_away_win() {
    let r = reconcile(&finished(3, 2), Scores::new(1, 4)).unwrap();

    // home: undo win (-1 W, -2 P), apply regulation loss (+1 L)
    assert_eq!(
        r.home,
        TeamDelta { team_id: HOME, wins: -1, losses: 1, otl: 0, points: -2 }
    );
    // away: undo OT loss (-1 OTL, -1 P), apply win (+1 W, +2 P)
    assert_eq!(
        r.away,
        TeamDelta { team_id: AWAY, wins: 1, losses: 0, otl: -1, points: 1 }
    );
}

#[test]
fn identical_resubmission_is_a_noop() {
    for (h, a) in [(3, 2), (5, 1), (0, 1), (2, 7)] {
        let r = reconcile(&finished(h, a), Scores::new(h, a)).unwrap();
        assert!(r.is_noop_for_standings(), "resubmitting {h}-{a} must net to zero");
        assert_eq!(r.next, finished(h, a));
    }
}

#[test]
fn resubmission_is_idempotent_on_standings() {
    let mut home = Standing::default();
    let mut away = Standing::default();

    let first = reconcile(&MatchState::scheduled(HOME, AWAY), Scores::new(4, 3)).unwrap();
    apply(&first, &mut home, &mut away);
    let after_first = (home, away);

    let second = reconcile(&first.next, Scores::new(4, 3)).unwrap();
    apply(&second, &mut home, &mut away);

    assert_eq!((home, away), after_first);
}

#[test]
fn correction_matches_first_ever_submission() {
    let scores: Vec<(i32, i32)> = (0..=5)
        .flat_map(|h| (0..=5).map(move |a| (h, a)))
        .filter(|(h, a)| h != a)
        .collect();

    for &(h1, a1) in &scores {
        for &(h2, a2) in &scores {
            let mut home = Standing::default();
            let mut away = Standing::default();

            let first = reconcile(&MatchState::scheduled(HOME, AWAY), Scores::new(h1, a1)).unwrap();
            apply(&first, &mut home, &mut away);
            let fix = reconcile(&first.next, Scores::new(h2, a2)).unwrap();
            apply(&fix, &mut home, &mut away);

            let mut direct_home = Standing::default();
            let mut direct_away = Standing::default();
            let direct = reconcile(&MatchState::scheduled(HOME, AWAY), Scores::new(h2, a2)).unwrap();
            apply(&direct, &mut direct_home, &mut direct_away);

            assert_eq!(home, direct_home, "{h1}-{a1} -> {h2}-{a2} (home)");
            assert_eq!(away, direct_away, "{h1}-{a1} -> {h2}-{a2} (away)");
        }
    }
}

#[test]
fn finished_without_scores_reverses_nothing() {
    let prev = MatchState {
        home_team_id: HOME,
        away_team_id: AWAY,
        status: MatchStatus::Finished,
        home_score: Some(3),
        away_score: None,
    };
    let r = reconcile(&prev, Scores::new(2, 0)).unwrap();

    assert_eq!(r.home, TeamDelta::win(HOME));
    assert_eq!(r.away, TeamDelta::loss(AWAY, LossKind::Regulation));
}
