use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::{
    dto::{Pagination, SendNudgeRequest},
    repo_types::Nudge,
    services::{send_nudge, NudgeError},
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn nudge_routes() -> Router<AppState> {
    Router::new().route("/nudges", get(list_nudges).post(create_nudge))
}

#[instrument(skip(state))]
pub async fn create_nudge(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SendNudgeRequest>,
) -> Result<(StatusCode, Json<Nudge>), (StatusCode, String)> {
    match send_nudge(
        state.store.as_ref(),
        &state.cooldowns,
        user_id,
        body.to_user_id,
        body.nudge_type,
        Instant::now(),
    )
    .await
    {
        Ok(nudge) => Ok((StatusCode::CREATED, Json(nudge))),
        Err(NudgeError::Store(e)) => {
            error!(error = %e, %user_id, "send nudge failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send nudge".into(),
            ))
        }
        Err(e) => {
            warn!(error = %e, %user_id, "nudge rejected");
            Err((e.status(), e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn list_nudges(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Nudge>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    state
        .store
        .nudges_to(user_id, limit, offset)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "list nudges failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load nudges".into(),
            )
        })
}
