//! HTTP handlers for all web routes.

pub mod pages;
pub mod data;
pub mod actions;
pub mod models;
pub mod single;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use hermes_common::Notification;
use hermes_config::{SelectionScope, StoredSelection};
use tracing::warn;

use crate::state::AppState;

/// Attachment response for a CSV download.
pub(crate) fn csv_download(file_name: &str, body: String) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', "_"));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Remember the last choice of a flow. Failing to persist is not fatal.
pub(crate) fn remember(state: &AppState, scope: SelectionScope, model: &str, version: Option<&str>, evaluate: bool) {
    let selection = StoredSelection {
        model: Some(model.to_string()),
        version: version.map(str::to_string),
        evaluate,
    };
    if let Err(e) = state.preferences.save_selection(scope, &selection) {
        warn!("Could not save {} selection: {}", scope.prefix(), e);
    }
}

/// Broadcast an optional notification, passing it through.
pub(crate) fn announce(state: &AppState, notification: Option<Notification>) -> Option<Notification> {
    notification.map(|n| state.notify(n))
}
