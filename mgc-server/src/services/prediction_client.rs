//! Genre classification client
//!
//! Sends one audio clip to the external classifier and returns its
//! `{genre, probabilities}` result. This is the only call site of the classifier.
//!
//! Under [`FallbackPolicy::Substitute`] every failure (non-2xx status, connection error,
//! timeout, malformed body) is replaced by the deterministic fallback prediction.
//! Under [`FallbackPolicy::Surface`] the failure is returned to the caller.
//! One attempt per clip: no retries, no backoff.

use bytes::Bytes;
use mgc_common::config::FallbackPolicy;
use mgc_common::{fallback_prediction, PredictionResponse};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("mgc-server/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CONTENT_TYPE: &str = "audio/wav";
const AUDIO_FIELD: &str = "audio";

/// Why a classification attempt failed
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// Connection refused, DNS failure, timeout, or other transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Classifier answered with a non-success status
    #[error("Classifier returned HTTP {0}")]
    Status(u16),

    /// Success status but the body is not a valid prediction
    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    /// HTTP client could not be constructed
    #[error("Client setup error: {0}")]
    Setup(String),
}

/// Client for the external classification endpoint
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http_client: reqwest::Client,
    endpoint: String,
    fallback_policy: FallbackPolicy,
}

impl PredictionClient {
    /// Create a client; `timeout` bounds the whole request including the response body
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        fallback_policy: FallbackPolicy,
    ) -> Result<Self, ClassificationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassificationError::Setup(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            fallback_policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback_policy
    }

    /// Classify one clip, applying the fallback policy on failure
    ///
    /// Never returns `Err` under [`FallbackPolicy::Substitute`].
    pub async fn classify(
        &self,
        audio: Bytes,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<PredictionResponse, ClassificationError> {
        match self.request_prediction(audio, file_name, content_type).await {
            Ok(prediction) => {
                tracing::info!(
                    file_name = %file_name,
                    genre = %prediction.genre,
                    "Classifier prediction received"
                );
                Ok(prediction)
            }
            Err(e) => match self.fallback_policy {
                FallbackPolicy::Substitute => {
                    tracing::warn!(
                        file_name = %file_name,
                        endpoint = %self.endpoint,
                        error = %e,
                        "Classifier unavailable, returning fallback prediction"
                    );
                    Ok(fallback_prediction())
                }
                FallbackPolicy::Surface => {
                    tracing::warn!(
                        file_name = %file_name,
                        endpoint = %self.endpoint,
                        error = %e,
                        "Classifier unavailable"
                    );
                    Err(e)
                }
            },
        }
    }

    /// Single multipart POST to the classifier, without fallback
    async fn request_prediction(
        &self,
        audio: Bytes,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<PredictionResponse, ClassificationError> {
        let form = Form::new().part(AUDIO_FIELD, audio_part(audio, file_name, content_type)?);

        tracing::debug!(endpoint = %self.endpoint, file_name = %file_name, "Querying classifier");

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassificationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassificationError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClassificationError::Network(e.to_string()))?;

        serde_json::from_slice::<PredictionResponse>(&body)
            .map_err(|e| ClassificationError::Malformed(e.to_string()))
    }
}

/// Multipart part carrying the clip; an unparseable content type falls back to `audio/wav`
fn audio_part(
    audio: Bytes,
    file_name: &str,
    content_type: Option<&str>,
) -> Result<Part, ClassificationError> {
    let length = audio.len() as u64;
    let part = || Part::stream_with_length(audio.clone(), length).file_name(file_name.to_string());

    if let Some(content_type) = content_type {
        match part().mime_str(content_type) {
            Ok(part) => return Ok(part),
            Err(e) => tracing::debug!(content_type = %content_type, error = %e, "Ignoring upload content type"),
        }
    }
    part()
        .mime_str(DEFAULT_CONTENT_TYPE)
        .map_err(|e| ClassificationError::Setup(e.to_string()))
}
