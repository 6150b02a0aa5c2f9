//! Statistics aggregator: per-genre counts over a principal's history

use mgc_common::{Genre, Result};
use sqlx::SqlitePool;

use crate::db::predictions;
use crate::models::{PredictionStats, Principal};

/// Count `genres`; genres that never occur get no entry
pub fn aggregate<I>(genres: I) -> PredictionStats
where
    I: IntoIterator<Item = Genre>,
{
    let mut stats = PredictionStats::default();
    for genre in genres {
        stats.total_predictions += 1;
        *stats.genre_counts.entry(genre).or_insert(0) += 1;
    }
    stats
}

/// Aggregate the caller's records; anonymous callers get the zero result
pub async fn prediction_stats(
    pool: &SqlitePool,
    principal: Option<&Principal>,
) -> Result<PredictionStats> {
    match principal {
        None => Ok(PredictionStats::default()),
        Some(principal) => {
            let genres = predictions::genres_by_owner(pool, principal.user_id).await?;
            Ok(aggregate(genres))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aggregate_counts_and_omits_absent_genres() {
        let stats = aggregate([Genre::Rock, Genre::Pop, Genre::Rock, Genre::Jazz]);
        assert_eq!(stats.total_predictions, 4);
        assert_eq!(stats.genre_counts.get(&Genre::Rock), Some(&2));
        assert_eq!(stats.genre_counts.get(&Genre::Pop), Some(&1));
        assert_eq!(stats.genre_counts.get(&Genre::Jazz), Some(&1));
        assert!(!stats.genre_counts.contains_key(&Genre::Blues));
        assert_eq!(stats.genre_counts.len(), 3);
    }

    #[test]
    fn test_empty_history_serializes_to_zero_result() {
        let value = serde_json::to_value(aggregate(Vec::<Genre>::new())).unwrap();
        assert_eq!(value, json!({ "totalPredictions": 0, "genreCounts": {} }));
    }

    #[test]
    fn test_genre_counts_use_labels_as_keys() {
        let value = serde_json::to_value(aggregate([Genre::Hiphop, Genre::Hiphop])).unwrap();
        assert_eq!(value["genreCounts"], json!({ "hiphop": 2 }));
    }
}
