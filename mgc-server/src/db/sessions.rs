//! Session token rows

use mgc_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::users::UserRow;

/// Store a new session token for `user_guid`
pub async fn insert_session(
    pool: &SqlitePool,
    token: &str,
    user_guid: Uuid,
    created_at: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token, user_guid, created_at) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_guid.to_string())
        .bind(created_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Resolve a session token to its user
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<UserRow>> {
    let row = sqlx::query(
        r#"
        SELECT u.guid, u.username, u.password_hash, u.is_anonymous
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(UserRow::from_sqlite_row).transpose()
}

/// Delete a session token; returns the number of rows removed
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
