//! POST /api/predict
//!
//! Full upload flow: validate the clip, classify it through the prediction client,
//! and store the outcome when the caller is signed in. Validation failures return
//! 400 before any network activity.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::{Bytes, BytesMut};
use mgc_common::validation::{validate_upload, MAX_UPLOAD_BYTES};
use mgc_common::PredictionResponse;
use serde::Serialize;
use tracing::{debug, info};

use super::session::CurrentPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::services::persistence;
use crate::AppState;

/// Multipart part holding the clip
pub const AUDIO_FIELD: &str = "audio";

/// Room for multipart boundaries and part headers on top of the clip itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Response of POST /api/predict
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub prediction: PredictionResponse,
    /// Id of the stored record; `None` for anonymous visitors
    pub record_id: Option<String>,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Read the clip, re-validating the size as chunks arrive
async fn read_upload(mut field: Field<'_>) -> ApiResult<Upload> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Audio part has no file name".to_string()))?;
    let content_type = field.content_type().map(str::to_string);

    // Extension first: an unsupported file is rejected before its body is read
    validate_upload(&file_name, 0)?;

    let mut data = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        data.extend_from_slice(&chunk);
        validate_upload(&file_name, data.len() as u64)?;
    }

    Ok(Upload {
        file_name,
        content_type,
        data: data.freeze(),
    })
}

/// POST /api/predict
pub async fn predict(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    mut multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(AUDIO_FIELD) {
            upload = Some(read_upload(field).await?);
            break;
        }
        debug!(field = ?field.name(), "Skipping multipart field");
    }
    let upload = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field \"{}\"", AUDIO_FIELD))
    })?;

    info!(
        file_name = %upload.file_name,
        size = upload.data.len(),
        signed_in = principal.is_some(),
        "Prediction requested"
    );

    let prediction = state
        .classifier
        .classify(upload.data, &upload.file_name, upload.content_type.as_deref())
        .await?;

    let record_id = match principal.as_ref() {
        Some(principal) => {
            let stored = persistence::store_prediction(
                &state.db,
                Some(principal),
                &upload.file_name,
                prediction.genre.as_str(),
                &prediction.probabilities,
            )
            .await?;
            Some(stored.id)
        }
        None => None,
    };

    Ok(Json(PredictResponse {
        prediction,
        record_id,
    }))
}

/// Build prediction route with a body limit sized for the largest accepted clip
pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/api/predict", post(predict))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES as usize + MULTIPART_OVERHEAD_BYTES,
        ))
}
