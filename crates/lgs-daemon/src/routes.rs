//! Axum router and all HTTP handlers for lgs-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers are `pub(crate)`; the scenario tests in
//! `tests/` compose the router directly.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use lgs_db::{submit_result, SubmitError, SubmitResult};
use lgs_schemas::{MatchFilter, TeamFilter};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::{
    api_types::{
        ErrorResponse, HealthResponse, MatchesQuery, MatchesResponse, SubmitResultResponse,
        TeamsQuery, TeamsResponse,
    },
    state::{AppState, BusMsg},
};

const MISSING_FIELDS: &str = "Missing required fields";

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/teams", get(teams))
        .route("/v1/matches", get(matches))
        .route("/v1/matches/result", post(record_result))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

/// Browser clients may call from any origin; preflight answers are cached
/// for a day.
pub fn cors_any_origin() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/teams
// ---------------------------------------------------------------------------

pub(crate) async fn teams(
    State(st): State<Arc<AppState>>,
    Query(q): Query<TeamsQuery>,
) -> Response {
    let filter = TeamFilter {
        conference: non_empty(q.conference),
    };

    match st.store.list_teams(&filter).await {
        Ok(teams) => (StatusCode::OK, Json(TeamsResponse { teams })).into_response(),
        Err(e) => storage_failure("teams", e),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/matches
// ---------------------------------------------------------------------------

pub(crate) async fn matches(
    State(st): State<Arc<AppState>>,
    Query(q): Query<MatchesQuery>,
) -> Response {
    let filter = MatchFilter {
        status: non_empty(q.status),
    };

    match st.store.list_matches(&filter).await {
        Ok(matches) => (StatusCode::OK, Json(MatchesResponse { matches })).into_response(),
        Err(e) => storage_failure("matches", e),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/matches/result
// ---------------------------------------------------------------------------

/// Record or correct a match result.
///
/// | outcome                          | status |
/// |----------------------------------|--------|
/// | committed                        | 200    |
/// | missing / malformed body, tie    | 400    |
/// | unknown match id                 | 404    |
/// | conflict retries exhausted       | 409    |
/// | storage failure                  | 500    |
pub(crate) async fn record_result(
    State(st): State<Arc<AppState>>,
    body: Result<Json<SubmitResult>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };

    match submit_result(st.store.as_ref(), &req, &st.retry).await {
        Ok(out) => {
            let match_id = out.match_view.id;
            let home_score = out.match_view.home_score.unwrap_or_default();
            let away_score = out.match_view.away_score.unwrap_or_default();
            info!(match_id, attempts = out.attempts, "matches/result");
            let _ = st.bus.send(BusMsg::ResultRecorded {
                match_id,
                home_team_id: out.home_team.id,
                away_team_id: out.away_team.id,
                home_score,
                away_score,
            });

            (
                StatusCode::OK,
                Json(SubmitResultResponse {
                    success: true,
                    match_id,
                    home_score,
                    away_score,
                    home_team: out.home_team,
                    away_team: out.away_team,
                }),
            )
                .into_response()
        }
        Err(SubmitError::InvalidInput(reason)) => error_response(StatusCode::BAD_REQUEST, &reason),
        Err(SubmitError::NotFound { .. }) => error_response(StatusCode::NOT_FOUND, "Match not found"),
        Err(e @ SubmitError::ConflictRetry { .. }) => {
            let _ = st.bus.send(BusMsg::LogLine {
                level: "WARN".to_string(),
                msg: e.to_string(),
            });
            error_response(StatusCode::CONFLICT, &e.to_string())
        }
        Err(SubmitError::Storage(e)) => storage_failure("matches/result", e),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(ErrorResponse::new(msg))).into_response()
}

fn storage_failure(route: &'static str, e: anyhow::Error) -> Response {
    let detail = format!("{e:#}");
    error!(route, error = %detail, "storage failure");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::ResultRecorded { .. } => "result",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
