//! Scenario: submitting and correcting results through Postgres.
//!
//! # Invariant under test
//! Team counters always equal the outcome currently recorded for the match;
//! `points == 2*wins + otl` holds after every write.
//!
//! These tests require a live Postgres instance (LGS_DATABASE_URL).

mod common;

use lgs_db::{submit_result, PgStore, RetryPolicy, StandingsStore, SubmitError, SubmitResult};
use lgs_reconcile::MatchStatus;

#[tokio::test]
#[ignore = "requires LGS_DATABASE_URL"]
async fn first_result_then_correction() -> anyhow::Result<()> {
    let pool = common::pool().await?;
    let conf = common::unique_conference("submit");
    let home = common::team(&pool, &conf, "Home", 1).await?;
    let away = common::team(&pool, &conf, "Away", 2).await?;
    let match_id = common::scheduled_match(&pool, home, away, 1, 19).await?;

    let store = PgStore::new(pool.clone());
    let policy = RetryPolicy::default();

    // 3-2: home win, away overtime loss.
    let out = submit_result(&store, &SubmitResult::new(match_id, 3, 2), &policy).await?;
    assert_eq!(out.match_view.status, MatchStatus::Finished);
    assert_eq!(out.match_view.home_score, Some(3));
    assert_eq!((out.home_team.wins, out.home_team.points), (1, 2));
    assert_eq!((out.away_team.otl, out.away_team.points), (1, 1));

    // Correct to 1-4: away regulation win.
    let out = submit_result(&store, &SubmitResult::new(match_id, 1, 4), &policy).await?;
    assert_eq!(
        (out.home_team.wins, out.home_team.losses, out.home_team.otl, out.home_team.points),
        (0, 1, 0, 0)
    );
    assert_eq!(
        (out.away_team.wins, out.away_team.losses, out.away_team.otl, out.away_team.points),
        (1, 0, 0, 2)
    );

    // Same scores again: no change.
    let again = submit_result(&store, &SubmitResult::new(match_id, 1, 4), &policy).await?;
    assert_eq!(again.home_team, out.home_team);
    assert_eq!(again.away_team, out.away_team);
    assert!(again.reconciliation.is_noop_for_standings());

    for t in [again.home_team, again.away_team] {
        assert!(t.standing().points_invariant_holds(), "{t:?}");
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires LGS_DATABASE_URL"]
async fn rejected_submissions_leave_rows_untouched() -> anyhow::Result<()> {
    let pool = common::pool().await?;
    let conf = common::unique_conference("reject");
    let home = common::team(&pool, &conf, "Home", 1).await?;
    let away = common::team(&pool, &conf, "Away", 2).await?;
    let match_id = common::scheduled_match(&pool, home, away, 2, 19).await?;

    let store = PgStore::new(pool.clone());
    let policy = RetryPolicy::default();
    submit_result(&store, &SubmitResult::new(match_id, 5, 1), &policy).await?;
    let before_home = store.fetch_team(home).await?.unwrap();
    let before_match = store.fetch_match(match_id).await?.unwrap();

    let tie = submit_result(&store, &SubmitResult::new(match_id, 2, 2), &policy).await;
    assert!(matches!(tie, Err(SubmitError::InvalidInput(_))));

    let missing = submit_result(&store, &SubmitResult::new(i32::MAX, 2, 1), &policy).await;
    assert!(matches!(missing, Err(SubmitError::NotFound { match_id: i32::MAX })));

    assert_eq!(store.fetch_team(home).await?.unwrap(), before_home);
    assert_eq!(store.fetch_match(match_id).await?.unwrap(), before_match);
    Ok(())
}
