//! Handler errors and their HTTP responses.
//!
//! Only request-shape problems surface here. Validation and remote API
//! failures are reported to the user as notifications instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hermes_common::HermesError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown result: {0}")]
    UnknownResult(String),

    #[error(transparent)]
    Hermes(#[from] HermesError),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::UnknownTable(_) | WebError::UnknownResult(_) => StatusCode::NOT_FOUND,
            WebError::Hermes(HermesError::Csv(_)) | WebError::Hermes(HermesError::Encoding) => StatusCode::BAD_REQUEST,
            WebError::Hermes(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_mapping() {
        assert_eq!(WebError::UnknownTable("csv-1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(WebError::UnknownResult("result-1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(WebError::Hermes(HermesError::Encoding).status(), StatusCode::BAD_REQUEST);
        let io = std::io::Error::other("disk");
        assert_eq!(WebError::Hermes(io.into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
