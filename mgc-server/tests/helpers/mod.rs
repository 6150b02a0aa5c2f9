//! Shared integration test helpers
//!
//! - [`StubClassifier`]: a real HTTP server on 127.0.0.1:0 standing in for the classifier
//! - [`TestApp`]: the full router over an in-memory database
//! - request/response helpers for driving the router with `oneshot`

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mgc_common::config::FallbackPolicy;
use mgc_server::services::PredictionClient;
use mgc_server::AppState;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "mgc-test-boundary";

/// How the stub classifier answers
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// 200 with this JSON body
    Respond(Value),
    /// Empty body with this status
    Status(StatusCode),
    /// 200 with a body that is not a prediction
    Malformed,
    /// Sleep before answering with the JSON body
    Delay(Duration, Value),
}

/// One multipart part the stub received
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub field_name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedPart>>>,
}

/// Classifier stand-in listening on an ephemeral port
pub struct StubClassifier {
    pub endpoint: String,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedPart>>>,
}

impl StubClassifier {
    pub async fn start(behavior: StubBehavior) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behavior,
            calls: calls.clone(),
            received: received.clone(),
        };

        let app = Router::new()
            .route("/predict", post(stub_predict))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub classifier");
        let addr = listener.local_addr().expect("Stub classifier has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            endpoint: format!("http://{}/predict", addr),
            calls,
            received,
        }
    }

    /// Number of requests the stub has answered or started answering
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<ReceivedPart> {
        self.received.lock().expect("received lock poisoned").clone()
    }
}

async fn stub_predict(State(state): State<StubState>, mut multipart: Multipart) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state
            .received
            .lock()
            .expect("received lock poisoned")
            .push(ReceivedPart {
                field_name,
                file_name,
                content_type,
                len,
            });
    }

    match state.behavior {
        StubBehavior::Respond(body) => axum::Json(body).into_response(),
        StubBehavior::Status(status) => status.into_response(),
        StubBehavior::Malformed => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"genre": "polka", "probabilities": {}}"#,
        )
            .into_response(),
        StubBehavior::Delay(delay, body) => {
            tokio::time::sleep(delay).await;
            axum::Json(body).into_response()
        }
    }
}

/// Probabilities for a confident jazz prediction
pub fn jazz_prediction() -> Value {
    json!({
        "genre": "jazz",
        "probabilities": {
            "blues": 0.05, "classical": 0.02, "country": 0.01, "disco": 0.01,
            "hiphop": 0.01, "jazz": 0.82, "metal": 0.01, "pop": 0.03,
            "reggae": 0.02, "rock": 0.02
        }
    })
}

/// Probabilities object with `winner` at 0.9 and the rest sharing the remainder
pub fn probabilities_for(winner: &str) -> Value {
    let genres = [
        "blues", "classical", "country", "disco", "hiphop", "jazz", "metal", "pop", "reggae",
        "rock",
    ];
    let mut probabilities = serde_json::Map::new();
    for genre in genres {
        let value = if genre == winner { 0.91 } else { 0.01 };
        probabilities.insert(genre.to_string(), json!(value));
    }
    Value::Object(probabilities)
}

/// Router plus the pool behind it
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new(endpoint: &str, fallback_policy: FallbackPolicy) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(5), fallback_policy).await
    }

    pub async fn with_timeout(
        endpoint: &str,
        timeout: Duration,
        fallback_policy: FallbackPolicy,
    ) -> Self {
        let pool = mgc_common::db::init_memory_database()
            .await
            .expect("Failed to create in-memory database");
        let classifier = PredictionClient::new(endpoint, timeout, fallback_policy)
            .expect("Failed to create prediction client");
        let router = mgc_server::build_router(AppState::new(pool.clone(), classifier));
        Self { router, pool }
    }

    /// App whose classifier endpoint refuses connections
    pub async fn without_classifier() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Self::new(
            &format!("http://127.0.0.1:{}/predict", port),
            FallbackPolicy::Substitute,
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(with_token(Request::builder().method("GET").uri(uri), token)
            .body(Body::empty())
            .unwrap())
        .await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(
            with_token(Request::builder().method("POST").uri(uri), token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload(
        &self,
        token: Option<&str>,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        self.send(
            with_token(Request::builder().method("POST").uri("/api/predict"), token)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
                )
                .body(Body::from(multipart_body("audio", file_name, content_type, data)))
                .unwrap(),
        )
        .await
    }

    /// Anonymous sign-in, returning the bearer token
    pub async fn anonymous_token(&self) -> String {
        let (status, body) = self.post_json("/api/auth/anonymous", None, json!({})).await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    /// Sign up a credentialed user, returning the bearer token
    pub async fn sign_up(&self, username: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/auth/sign-up",
                None,
                json!({"username": username, "password": "long enough password"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    /// Store a record through the API, returning its id
    pub async fn store(&self, token: &str, file_name: &str, genre: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/predictions",
                Some(token),
                json!({
                    "fileName": file_name,
                    "predictedGenre": genre,
                    "probabilities": probabilities_for(genre),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "store failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

/// Single-part multipart/form-data body using [`MULTIPART_BOUNDARY`]
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
