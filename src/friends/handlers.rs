use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{FriendProfileView, FriendSummary, RequestsResponse, SendRequestBody},
    error::FriendError,
    repo_types::{FriendRequest, Friendship},
    services,
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends))
        .route("/friends/requests", get(list_requests).post(send_request))
        .route("/friends/requests/:id/accept", post(accept_request))
        .route("/friends/requests/:id/decline", post(decline_request))
        .route("/friends/requests/:id/cancel", post(cancel_request))
        .route("/friends/:id", get(get_friend))
}

fn reject(e: FriendError, what: &str) -> (StatusCode, String) {
    if e.is_validation() {
        warn!(error = %e, "{} rejected", what);
        (e.status(), e.to_string())
    } else {
        error!(error = %e, "{} failed", what);
        (e.status(), format!("Failed to {}", what))
    }
}

fn internal(e: anyhow::Error, what: &str) -> (StatusCode, String) {
    reject(FriendError::Store(e), what)
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FriendSummary>>, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    services::list_friends(state.store.as_ref(), user_id, today)
        .await
        .map(Json)
        .map_err(|e| internal(e, "load friends"))
}

#[instrument(skip(state))]
pub async fn get_friend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendProfileView>, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    services::friend_profile(state.store.as_ref(), user_id, friend_id, today)
        .await
        .map(Json)
        .map_err(|e| reject(e, "load profile"))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<RequestsResponse>, (StatusCode, String)> {
    let store = state.store.as_ref();
    let incoming = services::incoming_requests(store, user_id)
        .await
        .map_err(|e| internal(e, "load friend requests"))?;
    let outgoing = services::outgoing_requests(store, user_id)
        .await
        .map_err(|e| internal(e, "load friend requests"))?;
    Ok(Json(RequestsResponse { incoming, outgoing }))
}

#[instrument(skip(state, body))]
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SendRequestBody>,
) -> Result<(StatusCode, Json<FriendRequest>), (StatusCode, String)> {
    let request = services::send_request_by_code(state.store.as_ref(), user_id, &body.invite_code)
        .await
        .map_err(|e| reject(e, "send friend request"))?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip(state))]
pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Friendship>, (StatusCode, String)> {
    match services::accept_request(state.store.as_ref(), user_id, id).await {
        Ok(Some(f)) => Ok(Json(f)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Friend request not found".into())),
        Err(e) => Err(internal(e, "accept request")),
    }
}

#[instrument(skip(state))]
pub async fn decline_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FriendRequest>, (StatusCode, String)> {
    match services::decline_request(state.store.as_ref(), user_id, id).await {
        Ok(Some(r)) => Ok(Json(r)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Friend request not found".into())),
        Err(e) => Err(internal(e, "decline request")),
    }
}

#[instrument(skip(state))]
pub async fn cancel_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FriendRequest>, (StatusCode, String)> {
    match services::cancel_request(state.store.as_ref(), user_id, id).await {
        Ok(Some(r)) => Ok(Json(r)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Friend request not found".into())),
        Err(e) => Err(internal(e, "cancel request")),
    }
}
