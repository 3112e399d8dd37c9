//! Scenario: `points == 2*wins + otl` after any sequence of submissions and
//! corrections across a small league.

use std::collections::BTreeMap;

use lgs_reconcile::*;

#[test]
fn invariant_holds_across_submissions_and_corrections() {
    let mut table: BTreeMap<i32, Standing> = (1..=4).map(|id| (id, Standing::default())).collect();
    let mut matches: Vec<MatchState> = vec![
        MatchState::scheduled(1, 2),
        MatchState::scheduled(3, 4),
        MatchState::scheduled(1, 3),
        MatchState::scheduled(2, 4),
        MatchState::scheduled(4, 1),
    ];

    // (match index, home, away); later entries for an index are corrections.
    let submissions = [
        (0, 3, 2),
        (1, 1, 5),
        (2, 4, 4), // rejected: tie
        (2, 2, 1),
        (0, 1, 4),
        (3, 0, 1),
        (4, 6, 2),
        (1, 5, 1),
        (0, 1, 4),
        (4, 2, 3),
    ];

    for (idx, h, a) in submissions {
        let prev = matches[idx].clone();
        let Ok(r) = reconcile(&prev, Scores::new(h, a)) else {
            continue;
        };
        table.get_mut(&r.home.team_id).unwrap().apply(&r.home);
        table.get_mut(&r.away.team_id).unwrap().apply(&r.away);
        matches[idx] = r.next;

        for (id, s) in &table {
            assert!(s.points_invariant_holds(), "team {id} broke invariant: {s:?}");
        }
    }

    // Counters equal the sum of results currently in effect.
    let mut expected: BTreeMap<i32, Standing> =
        (1..=4).map(|id| (id, Standing::default())).collect();
    for m in &matches {
        let Some(sc) = m.applied_scores() else { continue };
        let outcome = Outcome::from_scores(sc.home, sc.away).unwrap();
        let (h, a) = outcome_delta(outcome, m.home_team_id, m.away_team_id);
        expected.get_mut(&h.team_id).unwrap().apply(&h);
        expected.get_mut(&a.team_id).unwrap().apply(&a);
    }
    assert_eq!(table, expected);

    let games: i32 = table.values().map(|s| s.games_played()).sum();
    assert_eq!(games, 2 * 5, "every finished match counts once per side");
}
