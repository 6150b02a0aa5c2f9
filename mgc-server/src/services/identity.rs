//! Authentication collaborator
//!
//! Password and anonymous sign-in, sign-out, and bearer-token lookup. Anonymous
//! sign-in creates a real principal that can own predictions; a request without a
//! valid token has no principal at all.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use mgc_common::time::now_millis;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{sessions, users};
use crate::models::Principal;

pub const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_LEN: usize = 64;

/// Well-formed hash with default argon2 params that matches no password.
/// Verified on the unknown-user path so sign-in costs the same either way.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Authentication failures
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Common(#[from] mgc_common::Error),
}

/// Token plus the principal it resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub principal: Principal,
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

async fn hash_password(password: String) -> Result<String, IdentityError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| IdentityError::Hashing(e.to_string()))?
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, IdentityError> {
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| IdentityError::Hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| IdentityError::Hashing(e.to_string()))?
}

async fn open_session(pool: &SqlitePool, principal: Principal) -> Result<AuthSession, IdentityError> {
    let token = generate_token();
    sessions::insert_session(pool, &token, principal.user_id, now_millis()).await?;
    Ok(AuthSession { token, principal })
}

/// Create a credentialed user and sign them in
pub async fn sign_up(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<AuthSession, IdentityError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(IdentityError::InvalidInput("Username must not be empty".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(password.to_string()).await?;
    let user_id = Uuid::new_v4();
    let outcome = users::insert_user(
        pool,
        user_id,
        Some(username),
        Some(&password_hash),
        false,
        now_millis(),
    )
    .await?;
    if outcome == users::InsertOutcome::UsernameTaken {
        return Err(IdentityError::UsernameTaken(username.to_string()));
    }

    info!(user_id = %user_id, username = %username, "User signed up");
    open_session(
        pool,
        Principal {
            user_id,
            username: Some(username.to_string()),
            is_anonymous: false,
        },
    )
    .await
}

/// Verify credentials and open a session
pub async fn sign_in(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<AuthSession, IdentityError> {
    let user = users::find_by_username(pool, username.trim()).await?;
    let Some((user, stored_hash)) =
        user.and_then(|u| u.password_hash.clone().map(|hash| (u, hash)))
    else {
        let _ = verify_password(password.to_string(), DUMMY_PASSWORD_HASH.to_string()).await;
        return Err(IdentityError::InvalidCredentials);
    };

    if !verify_password(password.to_string(), stored_hash).await? {
        debug!(user_id = %user.guid, "Password mismatch");
        return Err(IdentityError::InvalidCredentials);
    }

    info!(user_id = %user.guid, "User signed in");
    open_session(
        pool,
        Principal {
            user_id: user.guid,
            username: user.username,
            is_anonymous: user.is_anonymous,
        },
    )
    .await
}

/// Create a fresh anonymous principal and open a session for it
pub async fn sign_in_anonymously(pool: &SqlitePool) -> Result<AuthSession, IdentityError> {
    let user_id = Uuid::new_v4();
    users::insert_user(pool, user_id, None, None, true, now_millis()).await?;

    info!(user_id = %user_id, "Anonymous user signed in");
    open_session(
        pool,
        Principal {
            user_id,
            username: None,
            is_anonymous: true,
        },
    )
    .await
}

/// End a session; unknown tokens are ignored
pub async fn sign_out(pool: &SqlitePool, token: &str) -> Result<(), IdentityError> {
    let removed = sessions::delete_session(pool, token).await?;
    debug!(removed, "Session signed out");
    Ok(())
}

/// Resolve a bearer token to its principal
pub async fn current_principal(
    pool: &SqlitePool,
    token: Option<&str>,
) -> Result<Option<Principal>, IdentityError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let principal = sessions::find_user_by_token(pool, token)
        .await?
        .map(|user| Principal {
            user_id: user.guid,
            username: user.username,
            is_anonymous: user.is_anonymous,
        });
    Ok(principal)
}
