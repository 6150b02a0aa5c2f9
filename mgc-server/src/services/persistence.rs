//! Persistence gateway: authorization-gated write of one prediction record
//!
//! Requires a principal. Without one the write fails loudly and nothing is stored.
//! The predicted genre is parsed into [`Genre`] before insertion, so unknown labels
//! never reach storage.

use mgc_common::time::now_millis;
use mgc_common::{Genre, GenreProbabilities};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::predictions;
use crate::models::Principal;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User must be authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Common(#[from] mgc_common::Error),
}

/// Identifier and timestamp assigned to a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrediction {
    pub id: String,
    pub created_at: i64,
}

/// Store one prediction for `principal` and return the new record's id
pub async fn store_prediction(
    pool: &SqlitePool,
    principal: Option<&Principal>,
    file_name: &str,
    predicted_genre: &str,
    probabilities: &GenreProbabilities,
) -> Result<StoredPrediction, StoreError> {
    let principal = principal.ok_or(StoreError::Unauthenticated)?;
    let genre: Genre = predicted_genre.parse()?;

    let id = Uuid::new_v4();
    let created_at = predictions::insert_prediction(
        pool,
        id,
        principal.user_id,
        file_name,
        genre,
        probabilities,
        now_millis(),
    )
    .await?;

    info!(
        record_id = %id,
        owner = %principal.user_id,
        genre = %genre,
        "Prediction stored"
    );

    Ok(StoredPrediction {
        id: id.to_string(),
        created_at,
    })
}
