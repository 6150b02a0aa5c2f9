//! Prediction record rows
//!
//! Append-only: there is no update or delete.

use mgc_common::{Error, Genre, GenreProbabilities, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::PredictionRecord;

/// Insert one record and return its assigned `created_at`
///
/// `created_at` is `now_millis` clamped to the owner's newest existing value so their
/// history never goes backwards, even if the wall clock does.
pub async fn insert_prediction(
    pool: &SqlitePool,
    id: Uuid,
    owner: Uuid,
    file_name: &str,
    predicted_genre: Genre,
    probabilities: &GenreProbabilities,
    now_millis: i64,
) -> Result<i64> {
    let probabilities = serde_json::to_string(probabilities)
        .map_err(|e| Error::Internal(format!("Failed to serialize probabilities: {}", e)))?;

    let created_at: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO predictions (id, user_guid, file_name, predicted_genre, probabilities, created_at)
        VALUES (?, ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(created_at) FROM predictions WHERE user_guid = ?), 0)))
        RETURNING created_at
        "#,
    )
    .bind(id.to_string())
    .bind(owner.to_string())
    .bind(file_name)
    .bind(predicted_genre.as_str())
    .bind(&probabilities)
    .bind(now_millis)
    .bind(owner.to_string())
    .fetch_one(pool)
    .await?;

    Ok(created_at)
}

/// All records owned by `owner`, newest first
///
/// Equal timestamps fall back to insertion order, newest first.
pub async fn list_by_owner(pool: &SqlitePool, owner: Uuid) -> Result<Vec<PredictionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_guid, file_name, predicted_genre, probabilities, created_at
        FROM predictions
        WHERE user_guid = ?
        ORDER BY created_at DESC, seq DESC
        "#,
    )
    .bind(owner.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Predicted genre of every record owned by `owner`, unordered
pub async fn genres_by_owner(pool: &SqlitePool, owner: Uuid) -> Result<Vec<Genre>> {
    let genres: Vec<String> =
        sqlx::query_scalar("SELECT predicted_genre FROM predictions WHERE user_guid = ?")
            .bind(owner.to_string())
            .fetch_all(pool)
            .await?;

    genres.iter().map(|g| parse_stored_genre(g)).collect()
}

fn parse_stored_genre(raw: &str) -> Result<Genre> {
    raw.parse::<Genre>()
        .map_err(|_| Error::Internal(format!("Stored prediction has unknown genre {:?}", raw)))
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PredictionRecord> {
    let owner: String = row.get("user_guid");
    let owner = Uuid::parse_str(&owner)
        .map_err(|e| Error::Internal(format!("Invalid owner guid {:?}: {}", owner, e)))?;

    let predicted_genre: String = row.get("predicted_genre");
    let probabilities: String = row.get("probabilities");
    let probabilities: GenreProbabilities = serde_json::from_str(&probabilities)
        .map_err(|e| Error::Internal(format!("Failed to deserialize probabilities: {}", e)))?;

    Ok(PredictionRecord {
        id: row.get("id"),
        owner,
        file_name: row.get("file_name"),
        predicted_genre: parse_stored_genre(&predicted_genre)?,
        probabilities,
        created_at: row.get("created_at"),
    })
}
