use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, error, instrument};

use super::{
    dto::{ScoreView, TrackerView},
    model::{TrackerAction, TrackerSnapshot},
    repo,
};
use crate::{auth::jwt::AuthUser, score, state::AppState};

pub fn tracker_routes() -> Router<AppState> {
    Router::new()
        .route("/tracker", get(get_tracker).put(put_tracker))
        .route("/tracker/actions", post(apply_action))
        .route("/score", get(get_score))
}

fn score_view(snapshot: &TrackerSnapshot, now: OffsetDateTime) -> ScoreView {
    let progress = score::compute_progress(snapshot, now);
    let daily_score = progress.score();
    ScoreView {
        daily_score,
        message: score::score_message(i32::from(daily_score)),
        progress,
        completion: progress.completion(),
    }
}

fn view(snapshot: TrackerSnapshot) -> TrackerView {
    let score = score_view(&snapshot, OffsetDateTime::now_utc());
    TrackerView { snapshot, score }
}

#[instrument(skip(state))]
pub async fn get_tracker(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TrackerView>, (StatusCode, String)> {
    let snapshot = repo::load_snapshot(&state.db, user_id)
        .await
        .map_err(|e| failed("load tracker", e))?;
    Ok(Json(view(snapshot)))
}

/// Normalizes a client-supplied snapshot before it replaces the stored one.
fn replacement(mut snapshot: TrackerSnapshot) -> Result<TrackerSnapshot, (StatusCode, String)> {
    if snapshot.fasting.is_active && snapshot.fasting.start_time.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            "active fast requires start_time".into(),
        ));
    }
    if !snapshot.fasting.is_active {
        snapshot.fasting.start_time = None;
    }
    snapshot.sanitize();
    Ok(snapshot)
}

#[instrument(skip(state, snapshot))]
pub async fn put_tracker(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(snapshot): Json<TrackerSnapshot>,
) -> Result<Json<TrackerView>, (StatusCode, String)> {
    let snapshot = replacement(snapshot)?;
    repo::save_snapshot(&state.db, user_id, &snapshot)
        .await
        .map_err(|e| failed("save tracker", e))?;
    Ok(Json(view(snapshot)))
}

#[instrument(skip(state))]
pub async fn apply_action(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(action): Json<TrackerAction>,
) -> Result<Json<TrackerView>, (StatusCode, String)> {
    let mut snapshot = repo::load_snapshot(&state.db, user_id)
        .await
        .map_err(|e| failed("load tracker", e))?;

    snapshot.apply(&action, OffsetDateTime::now_utc());
    debug!(%user_id, ?action, "tracker action applied");

    repo::save_snapshot(&state.db, user_id, &snapshot)
        .await
        .map_err(|e| failed("save tracker", e))?;
    Ok(Json(view(snapshot)))
}

#[instrument(skip(state))]
pub async fn get_score(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ScoreView>, (StatusCode, String)> {
    let snapshot = repo::load_snapshot(&state.db, user_id)
        .await
        .map_err(|e| failed("load tracker", e))?;
    Ok(Json(score_view(&snapshot, OffsetDateTime::now_utc())))
}

fn failed(what: &str, e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "{} failed", what);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}", what),
    )
}
