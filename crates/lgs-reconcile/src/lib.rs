//! lgs-reconcile
//!
//! Standings reconciliation.
//!
//! Architectural decisions:
//! - A match result is turned into signed per-team deltas, never absolute totals
//! - A correction is an explicit reversal pass followed by an application pass
//! - A loss by exactly one goal is an overtime loss (1 point), anything wider
//!   is a regulation loss (0 points)
//! - Tied results are rejected; the points model has no draw
//!
//! Deterministic, pure logic. No IO. No store calls.

mod engine;
mod types;

pub use engine::{outcome_delta, reconcile, validate_scores};
pub use types::*;
