//! Request and response types for the lgs-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use lgs_schemas::{MatchView, TeamRow};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsQuery {
    pub conference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamRow>,
}

// ---------------------------------------------------------------------------
// GET /v1/matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchView>,
}

// ---------------------------------------------------------------------------
// POST /v1/matches/result
// ---------------------------------------------------------------------------

/// 200 body after a result is recorded. Team rows carry the standings as
/// committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResultResponse {
    pub success: bool,
    pub match_id: i32,
    pub home_score: i32,
    pub away_score: i32,
    pub home_team: TeamRow,
    pub away_team: TeamRow,
}
