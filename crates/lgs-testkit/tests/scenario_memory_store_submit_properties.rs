//! Scenario: result submission end-to-end against the in-memory store.
//!
//! GREEN when:
//! - after any sequence of submissions and corrections every team's
//!   counters equal the sum over its currently finished matches;
//! - `points == 2*wins + otl` holds for every team after every write;
//! - rejected submissions (tie, negative, unknown match) change nothing;
//! - listings come back in standings / schedule order.

use std::collections::BTreeMap;

use lgs_db::{submit_result, RetryPolicy, StandingsStore, SubmitError, SubmitResult};
use lgs_reconcile::{outcome_delta, MatchStatus, Outcome, Standing};
use lgs_schemas::{MatchFilter, TeamFilter};
use lgs_testkit::{load_league_fixture_json, parse_league_fixture, MemoryStore};

async fn league() -> MemoryStore {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/league_small.json");
    let fx = load_league_fixture_json(path).unwrap();
    MemoryStore::from_fixture(&fx).await.unwrap()
}

/// Recompute standings from scratch out of the finished matches.
async fn recomputed(store: &MemoryStore) -> BTreeMap<i32, Standing> {
    let mut out: BTreeMap<i32, Standing> = BTreeMap::new();
    for t in store.team_rows().await {
        out.insert(t.id, Standing::default());
    }
    for m in store.match_states().await.values() {
        let Some(s) = m.applied_scores() else { continue };
        let outcome = Outcome::from_scores(s.home, s.away).unwrap();
        let (h, a) = outcome_delta(outcome, m.home_team_id, m.away_team_id);
        out.get_mut(&h.team_id).unwrap().apply(&h);
        out.get_mut(&a.team_id).unwrap().apply(&a);
    }
    out
}

async fn assert_consistent(store: &MemoryStore) {
    let expected = recomputed(store).await;
    for t in store.team_rows().await {
        assert!(t.standing().points_invariant_holds(), "{t:?}");
        assert_eq!(t.standing(), expected[&t.id], "team {} drifted", t.name);
    }
}

#[tokio::test]
async fn counters_track_current_results_through_corrections() {
    let store = league().await;
    let policy = RetryPolicy::single_attempt();

    let script = [
        (1, 3, 2),
        (2, 5, 0),
        (1, 1, 4),
        (3, 2, 1),
        (1, 1, 4),
        (4, 0, 6),
        (2, 2, 3),
        (3, 0, 2),
        (1, 6, 5),
    ];
    for (match_id, h, a) in script {
        submit_result(&store, &SubmitResult::new(match_id, h, a), &policy)
            .await
            .unwrap();
        assert_consistent(&store).await;
    }

    let m1 = store.fetch_match(1).await.unwrap().unwrap();
    assert_eq!(m1.status, MatchStatus::Finished);
    assert_eq!((m1.home_score, m1.away_score), (Some(6), Some(5)));
}

#[tokio::test]
async fn submit_returns_updated_match_and_both_teams() {
    let store = league().await;
    let out = submit_result(
        &store,
        &SubmitResult::new(1, 3, 2),
        &RetryPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(out.attempts, 1);
    assert_eq!(out.match_view.home_team.name, "Bears");
    assert_eq!(out.match_view.away_team.emoji, "🐺");
    assert_eq!((out.home_team.wins, out.home_team.points), (1, 2));
    assert_eq!((out.away_team.otl, out.away_team.points), (1, 1));
    assert_eq!(store.fetch_team(out.home_team.id).await.unwrap(), Some(out.home_team));
}

#[tokio::test]
async fn rejected_submissions_change_nothing() {
    let store = league().await;
    let policy = RetryPolicy::default();
    submit_result(&store, &SubmitResult::new(1, 4, 1), &policy)
        .await
        .unwrap();

    let teams_before = store.team_rows().await;
    let matches_before = store.match_states().await;

    let tie = submit_result(&store, &SubmitResult::new(1, 2, 2), &policy).await;
    assert!(matches!(tie, Err(SubmitError::InvalidInput(_))));

    let negative = submit_result(&store, &SubmitResult::new(1, -1, 3), &policy).await;
    assert!(matches!(negative, Err(SubmitError::InvalidInput(_))));

    let missing = submit_result(&store, &SubmitResult::new(99, 2, 1), &policy).await;
    assert!(matches!(missing, Err(SubmitError::NotFound { match_id: 99 })));

    let partial = SubmitResult {
        match_id: Some(1),
        home_score: Some(2),
        away_score: None,
    };
    let partial = submit_result(&store, &partial, &policy).await;
    assert!(matches!(partial, Err(SubmitError::InvalidInput(_))));

    assert_eq!(store.team_rows().await, teams_before);
    assert_eq!(store.match_states().await, matches_before);
}

#[tokio::test]
async fn team_listing_orders_by_conference_then_points() {
    let store = league().await;
    let policy = RetryPolicy::default();
    // Wolves beat Bears twice. Eels and Sharks split, Eels losing in OT.
    submit_result(&store, &SubmitResult::new(1, 1, 3), &policy).await.unwrap();
    submit_result(&store, &SubmitResult::new(3, 2, 0), &policy).await.unwrap();
    submit_result(&store, &SubmitResult::new(2, 1, 4), &policy).await.unwrap();
    submit_result(&store, &SubmitResult::new(4, 2, 3), &policy).await.unwrap();

    let names: Vec<String> = store
        .list_teams(&TeamFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    // Both South teams have one win; the OTL point puts Eels ahead.
    assert_eq!(names, ["Wolves", "Bears", "Eels", "Sharks"]);

    let south = store
        .list_teams(&TeamFilter {
            conference: Some("South".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(south.len(), 2);
    assert!(south.iter().all(|t| t.conference == "South"));
    assert_eq!(south[1].badge.as_deref(), Some("champion"));

    let none = store
        .list_teams(&TeamFilter {
            conference: Some("south".to_string()),
        })
        .await
        .unwrap();
    assert!(none.is_empty(), "conference filter is an exact match");
}

#[tokio::test]
async fn ties_in_points_and_wins_fall_back_to_display_order() {
    let store = league().await;
    let teams = store.list_teams(&TeamFilter::default()).await.unwrap();
    let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Bears", "Wolves", "Sharks", "Eels"]);
}

#[tokio::test]
async fn match_listing_orders_by_date_then_time_and_filters_status() {
    let store = league().await;
    let all = store.list_matches(&MatchFilter::default()).await.unwrap();
    let ids: Vec<i32> = all.iter().map(|m| m.id).collect();
    assert_eq!(ids, [4, 2, 1, 3]);

    submit_result(&store, &SubmitResult::new(1, 2, 0), &RetryPolicy::default())
        .await
        .unwrap();

    let finished = store
        .list_matches(&MatchFilter {
            status: Some("finished".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].id, 1);

    let scheduled = store
        .list_matches(&MatchFilter {
            status: Some("scheduled".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(scheduled.iter().map(|m| m.id).collect::<Vec<_>>(), [4, 2, 3]);

    let unknown = store
        .list_matches(&MatchFilter {
            status: Some("postponed".to_string()),
        })
        .await
        .unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn fixture_with_dangling_team_index_is_rejected() {
    let json = r#"{
      "teams": [{"name": "Solo", "city": "X", "emoji": "x", "conference": "C", "display_order": 1}],
      "matches": [{"home": 0, "away": 3, "date": "2025-01-01", "time": "12:00:00"}]
    }"#;
    assert!(parse_league_fixture(json).is_err());
}
