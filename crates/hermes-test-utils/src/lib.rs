//! hermes-test-utils: Fixtures and an in-process mock of the remote
//! classification API for HERMES tests.
//!
//! ```ignore
//! let api = MockApi::spawn().await;
//! let client = HermesClient::new(api.base_url());
//! ```

pub use pretty_assertions;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hermes_common::CsvDocument;
use serde_json::{json, Value};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Small upload: three allowed columns, a label, a local-only column and one
/// row with no sendable values.
pub const SAMPLE_CSV: &str = "\
,orb_period,planet_radius,ra,label,notes
0,9.48,2.26,291.93,CONFIRMED,first
1,54.41,2.83,291.93,CANDIDATE,
2,,,,,blank features
3,1.73,14.6,297.0,FALSE POSITIVE,last
";

pub fn sample_document() -> CsvDocument {
    CsvDocument::parse("kepler.csv", SAMPLE_CSV.as_bytes()).expect("fixture parses")
}

pub fn models_json() -> Value {
    json!({
        "all_models": {
            "base": ["xgboost", "lightgbm"],
            "custom": ["1", "2", "10"],
            "experimental": ["alpha", "3"]
        }
    })
}

pub fn evaluation_json() -> Value {
    json!({
        "CONFIRMED": { "precision": 0.91, "recall": 0.88, "f1-score": 0.894, "support": 2 },
        "CANDIDATE": { "precision": 0.75, "recall": 0.8, "f1-score": 0.774, "support": 1 },
        "accuracy": 0.8667,
        "macro avg": { "precision": 0.83, "recall": 0.84, "f1-score": 0.834, "support": 3 },
        "weighted avg": { "precision": 0.86, "recall": 0.85, "f1-score": 0.854, "support": 3 }
    })
}

pub fn shap_json() -> Value {
    json!({
        "class_index": 0,
        "base_value": 0.3312,
        "per_feature": {
            "star_teff": 0.8,
            "ra": -0.3,
            "dec": 0.1,
            "koi_model_snr": 0.0
        }
    })
}

// ── Mock API ──────────────────────────────────────────────────────────────────

/// How an upload endpoint answers.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// One label per uploaded data row, cycling through the list
    Echo(Vec<String>),
    /// Fixed status and JSON body
    Fixed { status: u16, body: Value },
}

impl MockReply {
    pub fn fixed(status: u16, body: Value) -> Self {
        MockReply::Fixed { status, body }
    }
}

/// One request as seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub struct MockState {
    pub models: Mutex<MockReply>,
    pub models_delay: Mutex<Option<Duration>>,
    pub predict: Mutex<MockReply>,
    pub single: Mutex<MockReply>,
    pub retrain: Mutex<MockReply>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            models: Mutex::new(MockReply::fixed(200, models_json())),
            models_delay: Mutex::new(None),
            predict: Mutex::new(MockReply::Echo(vec!["CONFIRMED".into(), "CANDIDATE".into()])),
            single: Mutex::new(MockReply::fixed(
                200,
                json!({ "prediction": "CONFIRMED", "shap_values": shap_json(), "model_version": "2" }),
            )),
            retrain: Mutex::new(MockReply::fixed(
                200,
                json!({ "message": "Retraining started", "model": "custom", "model_version": "11" }),
            )),
            requests: Mutex::new(Vec::new()),
        }
    }
}

pub struct MockApi {
    base_url: String,
    pub state: Arc<MockState>,
}

impl MockApi {
    /// Serve the mock on an ephemeral localhost port.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/v1/models/all/", get(models))
            .route("/api/v1/predict/", post(predict))
            .route("/api/v1/predict/single/", post(predict_single))
            .route("/api/v1/retrain/", post(retrain))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock api server");
        });

        Self { base_url: format!("http://{addr}"), state }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_models(&self, reply: MockReply) {
        *self.state.models.lock().unwrap() = reply;
    }

    pub fn set_models_delay(&self, delay: Option<Duration>) {
        *self.state.models_delay.lock().unwrap() = delay;
    }

    pub fn set_predict(&self, reply: MockReply) {
        *self.state.predict.lock().unwrap() = reply;
    }

    pub fn set_single(&self, reply: MockReply) {
        *self.state.single.lock().unwrap() = reply;
    }

    pub fn set_retrain(&self, reply: MockReply) {
        *self.state.retrain.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn reply(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

fn data_rows(csv_text: &str) -> usize {
    csv::Reader::from_reader(csv_text.as_bytes()).records().count()
}

async fn read_upload(path: &str, query: HashMap<String, String>, mut multipart: Multipart) -> RecordedRequest {
    let mut recorded = RecordedRequest { path: path.to_string(), query, ..Default::default() };
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        recorded.file_name = field.file_name().map(str::to_string);
        recorded.content_type = field.content_type().map(str::to_string);
        recorded.body = field.text().await.unwrap_or_default();
    }
    recorded
}

fn answer_upload(state: &MockState, reply_for: &Mutex<MockReply>, recorded: RecordedRequest) -> Response {
    let current = reply_for.lock().unwrap().clone();
    let rows = data_rows(&recorded.body);
    let version = recorded.query.get("version").cloned();
    let evaluate = recorded.query.get("evaluate").is_some_and(|v| v == "true");
    state.requests.lock().unwrap().push(recorded);

    match current {
        MockReply::Fixed { status, body } => reply(status, body),
        MockReply::Echo(labels) => {
            let prediction: Vec<&String> = labels.iter().cycle().take(rows).collect();
            let mut body = json!({ "prediction": prediction, "rows": rows, "model_version": version });
            if evaluate {
                body["evaluation"] = evaluation_json();
            }
            reply(200, body)
        }
    }
}

async fn models(State(state): State<Arc<MockState>>) -> Response {
    let delay = *state.models_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    state.requests.lock().unwrap().push(RecordedRequest {
        path: "/api/v1/models/all/".into(),
        ..Default::default()
    });
    match state.models.lock().unwrap().clone() {
        MockReply::Fixed { status, body } => reply(status, body),
        MockReply::Echo(names) => reply(200, json!({ "all_models": { "base": names } })),
    }
}

async fn predict(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Response {
    let recorded = read_upload("/api/v1/predict/", query, multipart).await;
    answer_upload(&state, &state.predict, recorded)
}

async fn retrain(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Response {
    let recorded = read_upload("/api/v1/retrain/", query, multipart).await;
    answer_upload(&state, &state.retrain, recorded)
}

async fn predict_single(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: "/api/v1/predict/single/".into(),
        query,
        file_name: None,
        content_type: Some("application/json".into()),
        body,
    });
    match state.single.lock().unwrap().clone() {
        MockReply::Fixed { status, body } => reply(status, body),
        MockReply::Echo(labels) => reply(200, json!({ "prediction": labels.first() })),
    }
}
