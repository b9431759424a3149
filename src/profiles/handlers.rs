use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument, warn};

use super::{
    dto::UpdateProfileRequest,
    repo_types::Profile,
    services::validate_changes,
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, (StatusCode, String)> {
    match state.store.profile(user_id).await {
        Ok(Some(p)) => Ok(Json(p)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "load profile failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load profile".into(),
            ))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, (StatusCode, String)> {
    let changes = validate_changes(payload.into()).map_err(|e| {
        warn!(%user_id, error = %e, "invalid profile update");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    match state.store.update_profile(user_id, &changes).await {
        Ok(Some(p)) => {
            info!(%user_id, share_exact = p.privacy_share_exact_numbers, "profile updated");
            Ok(Json(p))
        }
        Ok(None) => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "update profile failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update settings".into(),
            ))
        }
    }
}
