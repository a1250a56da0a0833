use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::client::rainbet::AffiliateSource;
use crate::core::cycle::Cycle;
use crate::core::leaderboard::{previous_cycle_leaderboard, Leaderboard};
use crate::core::ranking::{Unweighted, WagerWeighting};
use crate::storage::MemoryCache;

const PREVIOUS_LEADERBOARD_ERROR: &str = "Failed to fetch previous leaderboard data.";

#[derive(Clone)]
pub struct AppState {
    pub cache: MemoryCache,
    pub source: Arc<dyn AffiliateSource>,
    pub limit: usize,
    pub weighting: Arc<dyn WagerWeighting>,
}

impl AppState {
    pub fn new(cache: MemoryCache, source: Arc<dyn AffiliateSource>, limit: usize) -> Self {
        AppState {
            cache,
            source,
            limit,
            weighting: Arc::new(Unweighted),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub entries: usize,
    pub cycle: Option<Cycle>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Current cycle, straight from the cache. Empty until the first refresh lands.
pub async fn current_leaderboard(State(state): State<AppState>) -> Json<Leaderboard> {
    Json(state.cache.read().leaderboard.clone())
}

/// Previous cycle, fetched on demand.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` with a generic message when the
/// upstream cannot be reached or answers garbage.
pub async fn previous_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Leaderboard>, (StatusCode, Json<ErrorResponse>)> {
    previous_cycle_leaderboard(
        state.source.as_ref(),
        Utc::now(),
        state.limit,
        state.weighting.as_ref(),
    )
    .await
    .map(Json)
    .map_err(|e| {
        error!("Could not fetch previous leaderboard. {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: PREVIOUS_LEADERBOARD_ERROR.to_string(),
            }),
        )
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.cache.read();
    Json(HealthResponse {
        status: "ok",
        entries: snapshot.leaderboard.len(),
        cycle: snapshot.cycle,
        refreshed_at: snapshot.timestamp,
    })
}
