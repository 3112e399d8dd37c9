//! Shared runtime state for lgs-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum; this module owns
//! nothing async itself apart from the heartbeat task.

use std::sync::Arc;
use std::time::Duration;

use lgs_config::SubmitConfig;
use lgs_db::{RetryPolicy, StandingsStore};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BusMsg — SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat {
        ts_millis: i64,
    },
    /// A match result was committed (first submission or correction).
    ResultRecorded {
        match_id: i32,
        home_team_id: i32,
        away_team_id: i32,
        home_score: i32,
        away_score: i32,
    },
    LogLine {
        level: String,
        msg: String,
    },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Team + match storage.
    pub store: Arc<dyn StandingsStore>,
    /// Retry budget for result submission.
    pub retry: RetryPolicy,
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn StandingsStore>, retry: RetryPolicy) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        Self {
            store,
            retry,
            bus,
            build: BuildInfo {
                service: "lgs-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn retry_policy_from(cfg: &SubmitConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts: cfg.max_attempts,
        base_delay_ms: cfg.base_delay_ms,
        max_delay_ms: cfg.max_delay_ms,
    }
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
