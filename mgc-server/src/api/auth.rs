//! Authentication endpoints
//!
//! - POST /api/auth/sign-up
//! - POST /api/auth/sign-in
//! - POST /api/auth/anonymous
//! - POST /api/auth/sign-out
//! - GET  /api/auth/me

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::session::{bearer_token, CurrentPrincipal};
use crate::error::ApiResult;
use crate::models::Principal;
use crate::services::identity::{self, AuthSession};
use crate::AppState;

/// Username/password request body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = identity::sign_up(&state.db, &request.username, &request.password).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = identity::sign_in(&state.db, &request.username, &request.password).await?;
    Ok(Json(session))
}

/// POST /api/auth/anonymous
pub async fn sign_in_anonymously(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = identity::sign_in_anonymously(&state.db).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        identity::sign_out(&state.db, &token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
///
/// The signed-in principal, or `null` for anonymous visitors.
pub async fn current_user(CurrentPrincipal(principal): CurrentPrincipal) -> Json<Option<Principal>> {
    Json(principal)
}

/// Build authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-up", post(sign_up))
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/anonymous", post(sign_in_anonymously))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/auth/me", get(current_user))
}
