//! Principal extraction from the `Authorization: Bearer <token>` header
//!
//! A missing, malformed or unknown token yields "no principal", never a rejection.
//! Handlers decide whether that is acceptable.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::error::ApiError;
use crate::models::Principal;
use crate::services::identity;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Token carried by the request, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Principal of the current request, or `None` for anonymous visitors
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers);
        let principal = identity::current_principal(&state.db, token.as_deref()).await?;
        if token.is_some() && principal.is_none() {
            debug!("Bearer token did not resolve to a session");
        }
        Ok(Self(principal))
    }
}
