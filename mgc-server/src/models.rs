//! Domain records exchanged between storage, services and HTTP handlers

use mgc_common::{Genre, GenreProbabilities};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    /// `None` for anonymous principals
    pub username: Option<String>,
    pub is_anonymous: bool,
}

/// One stored classification outcome. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: String,
    pub owner: Uuid,
    pub file_name: String,
    pub predicted_genre: Genre,
    pub probabilities: GenreProbabilities,
    /// Unix epoch milliseconds, assigned at write time
    pub created_at: i64,
}

/// Aggregate counts over one principal's history
///
/// `genre_counts` only holds genres seen at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total_predictions: u64,
    pub genre_counts: BTreeMap<Genre, u64>,
}
