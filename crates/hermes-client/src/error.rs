//! Client-side failures: validation (blocked before sending) and API errors
//! (reported after a request was made).

use hermes_common::Notification;
use thiserror::Error;

/// Maximum number of missing field names listed in a message.
const MISSING_PREVIEW: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("There are no rows to {0}.")]
    NoRows(&'static str),

    #[error("Please select a model first.")]
    NoModel,

    #[error("Please select a version for this model.")]
    NoVersion,

    #[error("Enter a target model name.")]
    MissingTargetModel,

    #[error("There are no allowed columns to send.")]
    NoAllowedColumns,

    /// Argument names the operation needing labels
    #[error("{0} requires a 'label' column in the table.")]
    MissingLabel(&'static str),

    #[error("All rows are empty; nothing to {0}.")]
    EmptyPayload(&'static str),

    #[error("Please fill these before classifying: {}", preview(.0))]
    MissingImportant(Vec<String>),
}

fn preview(missing: &[String]) -> String {
    let mut out = missing.iter().take(MISSING_PREVIEW).cloned().collect::<Vec<_>>().join(", ");
    if missing.len() > MISSING_PREVIEW {
        out.push('…');
    }
    out
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::NoRows(_) | ValidationError::EmptyPayload(_) => "No data",
            ValidationError::NoModel => "Pick a model",
            ValidationError::NoVersion => "Pick a version",
            ValidationError::MissingTargetModel => "Model required",
            ValidationError::NoAllowedColumns => "No valid columns",
            ValidationError::MissingLabel(_) => "Missing label column",
            ValidationError::MissingImportant(_) => "Missing important fields",
        }
    }

    pub fn to_notification(&self) -> Notification {
        Notification::warning(self.title(), self.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; message is the body's `detail` or `HTTP <status>`
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    #[error("Invalid response: prediction is not an array")]
    PredictionNotArray,

    #[error("Prediction length mismatch: got {got}, expected {expected}")]
    LengthMismatch { got: usize, expected: usize },

    #[error("Could not encode request: {0}")]
    Encode(#[from] hermes_common::HermesError),

    #[error("Request task failed: {0}")]
    Task(String),

    /// Superseded by a newer request; never reported
    #[error("Request aborted")]
    Aborted,
}

impl ApiError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }

    /// Error notification under `title`; `None` for aborted requests.
    pub fn to_notification(&self, title: &str) -> Option<Notification> {
        if self.is_aborted() {
            return None;
        }
        Some(Notification::error(title, self.to_string()))
    }
}

/// Failure of a full client flow (validate, send, merge).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    pub fn to_notification(&self, failure_title: &str) -> Option<Notification> {
        match self {
            ClientError::Validation(e) => Some(e.to_notification()),
            ClientError::Api(e) => e.to_notification(failure_title),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
