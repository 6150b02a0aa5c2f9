//! Prediction history endpoints
//!
//! - POST /api/predictions: store one prediction (requires a principal)
//! - GET  /api/predictions?genre=: the caller's history, newest first
//! - GET  /api/predictions/stats: per-genre counts
//!
//! The two reads answer anonymous callers with an empty/zero result instead of 401.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use mgc_common::GenreProbabilities;
use serde::Deserialize;

use super::session::CurrentPrincipal;
use crate::error::ApiResult;
use crate::models::{PredictionRecord, PredictionStats};
use crate::services::persistence::{self, StoredPrediction};
use crate::services::{history, statistics};
use crate::AppState;

/// Body of POST /api/predictions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePredictionRequest {
    pub file_name: String,
    /// Parsed into a genre by the persistence gateway
    pub predicted_genre: String,
    pub probabilities: GenreProbabilities,
}

/// Query string of GET /api/predictions
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub genre: Option<String>,
}

/// POST /api/predictions
pub async fn store_prediction(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(request): Json<StorePredictionRequest>,
) -> ApiResult<(StatusCode, Json<StoredPrediction>)> {
    let stored = persistence::store_prediction(
        &state.db,
        principal.as_ref(),
        &request.file_name,
        &request.predicted_genre,
        &request.probabilities,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/predictions
pub async fn list_predictions(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<PredictionRecord>>> {
    let records =
        history::list_history(&state.db, principal.as_ref(), query.genre.as_deref()).await?;
    Ok(Json(records))
}

/// GET /api/predictions/stats
pub async fn prediction_stats(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> ApiResult<Json<PredictionStats>> {
    let stats = statistics::prediction_stats(&state.db, principal.as_ref()).await?;
    Ok(Json(stats))
}

/// Build prediction history routes
pub fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/api/predictions", get(list_predictions).post(store_prediction))
        .route("/api/predictions/stats", get(prediction_stats))
}
