//! Test doubles for the standings stores.
//!
//! - [`MemoryStore`]: in-process [`lgs_db::StandingsStore`] with the same
//!   ordering and all-or-nothing semantics as the Postgres store.
//! - [`ConflictInjector`]: wraps any store and fails the first N
//!   `apply_result` calls with `ConflictRetry`.
//! - [`LeagueFixture`]: JSON seed data for either.

mod conflict;
mod fixture;
mod memory;

pub use conflict::ConflictInjector;
pub use fixture::{
    load_league_fixture_json, parse_league_fixture, FixtureMatch, FixtureTeam, LeagueFixture,
};
pub use memory::MemoryStore;
