//! HTTP client for the remote classification service.
//!
//! Endpoints (relative to the configured base URL):
//!   GET  /api/v1/models/all/
//!   POST /api/v1/predict/         multipart `file` = features.csv
//!   POST /api/v1/predict/single/  JSON `{ data: { feature: number } }`
//!   POST /api/v1/retrain/         multipart `file` = train.csv

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use crate::batch::Payload;
use crate::catalog::{ModelCatalog, ModelSelection};
use crate::error::{ApiError, Result};
use crate::single::SingleEntryForm;
use crate::wire::{PredictResponse, RetrainResponse, SinglePredictResponse};

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ClassifierApi: Send + Sync {
    async fn fetch_models(&self) -> Result<ModelCatalog>;
    async fn predict_batch(&self, selection: &ModelSelection, payload: &Payload) -> Result<PredictResponse>;
    async fn predict_single(&self, selection: &ModelSelection, form: &SingleEntryForm) -> Result<SinglePredictResponse>;
    async fn retrain(&self, selection: &ModelSelection, payload: &Payload) -> Result<RetrainResponse>;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Read the body as JSON. Non-2xx statuses become [`ApiError::Http`] with
/// the body's `detail` string when there is one.
async fn check_response_status(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string));
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        });
    }

    serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

fn csv_form(payload: &Payload, file_name: &'static str) -> Result<Form> {
    let part = Part::text(payload.to_csv()?)
        .file_name(file_name)
        .mime_str("text/csv")?;
    Ok(Form::new().part("file", part))
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HermesClient {
    base_url: String,
    client: reqwest::Client,
}

impl HermesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ClassifierApi for HermesClient {
    async fn fetch_models(&self) -> Result<ModelCatalog> {
        let resp = self.client.get(self.url("/api/v1/models/all/")).send().await?;
        let body = check_response_status(resp).await?;
        let catalog = ModelCatalog::from_json(&body)?;
        debug!("Fetched {} models", catalog.names().len());
        Ok(catalog)
    }

    async fn predict_batch(&self, selection: &ModelSelection, payload: &Payload) -> Result<PredictResponse> {
        info!("Classifying {} rows with {}", payload.row_count(), selection.display());
        let resp = self
            .client
            .post(self.url("/api/v1/predict/"))
            .query(&selection.query())
            .multipart(csv_form(payload, "features.csv")?)
            .send()
            .await?;
        let body = check_response_status(resp).await?;
        PredictResponse::from_json(&body, payload.row_count())
    }

    async fn predict_single(&self, selection: &ModelSelection, form: &SingleEntryForm) -> Result<SinglePredictResponse> {
        let selection = ModelSelection { evaluate: false, ..selection.clone() };
        debug!("Single-entry classification with {}", selection.display());
        let resp = self
            .client
            .post(self.url("/api/v1/predict/single/"))
            .query(&selection.query())
            .json(&form.request_body())
            .send()
            .await?;
        let body = check_response_status(resp).await?;
        SinglePredictResponse::from_json(&body)
    }

    async fn retrain(&self, selection: &ModelSelection, payload: &Payload) -> Result<RetrainResponse> {
        info!("Retraining {} on {} rows", selection.display(), payload.row_count());
        let resp = self
            .client
            .post(self.url("/api/v1/retrain/"))
            .query(&selection.query())
            .multipart(csv_form(payload, "train.csv")?)
            .send()
            .await?;
        let body = check_response_status(resp).await?;
        RetrainResponse::from_json(&body)
    }
}
