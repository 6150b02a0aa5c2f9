//! User account rows

use mgc_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// One row of the `users` table
#[derive(Debug, Clone)]
pub struct UserRow {
    pub guid: Uuid,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub is_anonymous: bool,
}

impl UserRow {
    pub(crate) fn from_sqlite_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self> {
        let guid: String = row.get("guid");
        let guid = Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Invalid user guid {:?}: {}", guid, e)))?;
        Ok(Self {
            guid,
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            is_anonymous: row.get::<i64, _>("is_anonymous") != 0,
        })
    }
}

/// Outcome of [`insert_user`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    UsernameTaken,
}

/// Insert a user; a duplicate username is reported, not raised
pub async fn insert_user(
    pool: &SqlitePool,
    guid: Uuid,
    username: Option<&str>,
    password_hash: Option<&str>,
    is_anonymous: bool,
    created_at: i64,
) -> Result<InsertOutcome> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (guid, username, password_hash, is_anonymous, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(username)
    .bind(password_hash)
    .bind(is_anonymous as i64)
    .bind(created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(InsertOutcome::UsernameTaken)
        }
        Err(e) => Err(Error::Database(e)),
    }
}

/// Look up a credentialed user by username
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRow>> {
    let row = sqlx::query(
        "SELECT guid, username, password_hash, is_anonymous FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(UserRow::from_sqlite_row).transpose()
}
