use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            RegisterResponse,
        },
        jwt::{AuthUser, JwtKeys},
        repo::User,
        services::{hash_password, is_valid_email, normalize_credentials, verify_password},
    },
    profiles::{
        repo_types::ProfileChanges,
        services::{create_profile, default_name, validate_changes},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn session(keys: &JwtKeys, user: User) -> Result<AuthResponse, (StatusCode, String)> {
    let (access_token, refresh_token) = keys.sign_pair(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to sign tokens".into())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    })
}

/// Creates the account and its profile. The account is removed again if the
/// profile cannot be created, so every user has exactly one profile.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, (StatusCode, String)> {
    let email = normalize_credentials(&payload.email, &payload.password).map_err(|e| {
        warn!(error = %e, "rejected registration");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let changes = validate_changes(ProfileChanges {
        name: payload.name.filter(|n| !n.trim().is_empty()),
        language: payload.language,
        ..Default::default()
    })
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let name = changes.name.unwrap_or_else(|| default_name(&email));
    let language = changes.language.unwrap_or_else(|| "en".into());

    match User::find_by_email(&state.db, &email).await {
        Ok(Some(_)) => {
            warn!(email = %email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to register".into()));
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to register".into())
    })?;

    let user = User::create(&state.db, &email, &hash).await.map_err(|e| {
        error!(error = %e, "create user failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to register".into())
    })?;

    let profile = match create_profile(state.store.as_ref(), user.id, &name, &language).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "profile creation failed, removing user");
            if let Err(e) = User::delete(&state.db, user.id).await {
                error!(error = %e, user_id = %user.id, "failed to remove orphaned user");
            }
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to register".into()));
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    let auth = session(&JwtKeys::from_ref(&state), user)?;
    Ok(Json(RegisterResponse { auth, profile }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to log in".into()));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to log in".into())
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(session(&JwtKeys::from_ref(&state), user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        (StatusCode::UNAUTHORIZED, "Invalid refresh token".into())
    })?;

    let user = match User::find_by_id(&state.db, claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err((StatusCode::UNAUTHORIZED, "User not found".into())),
        Err(e) => {
            error!(error = %e, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to refresh".into()));
        }
    };
    Ok(Json(session(&keys, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = match User::find_by_id(&state.db, user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err((StatusCode::UNAUTHORIZED, "User not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to load user".into()));
        }
    };
    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
