use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, instrument};

use super::{
    repo_types::UserStatsHistory,
    services::{self, DEFAULT_HISTORY_DAYS},
};
use crate::{auth::jwt::AuthUser, state::AppState, tracker::repo::load_snapshot};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}
fn default_days() -> i64 {
    DEFAULT_HISTORY_DAYS
}

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/today", post(record_today))
        .route("/stats/history", get(get_history))
}

#[instrument(skip(state))]
pub async fn record_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserStatsHistory>, (StatusCode, String)> {
    let snapshot = load_snapshot(&state.db, user_id).await.map_err(|e| {
        error!(error = %e, %user_id, "load tracker failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to record stats".to_string(),
        )
    })?;

    services::record_day(state.store.as_ref(), user_id, &snapshot, OffsetDateTime::now_utc())
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "record stats failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record stats".to_string(),
            )
        })
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<UserStatsHistory>>, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    services::history(state.store.as_ref(), user_id, today, q.days)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "load stats history failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load history".to_string(),
            )
        })
}
