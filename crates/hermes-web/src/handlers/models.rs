//! Model list for the selection controls.

use axum::extract::{Query, State};
use axum::Json;
use hermes_client::ModelCatalog;
use hermes_common::Notification;
use hermes_config::{SelectionScope, StoredSelection};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::handlers::announce;
use crate::state::{AppEvent, SharedState};

#[derive(Deserialize, Default)]
pub struct ModelsQuery {
    /// `cls` (default), `rt` or `single`
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelOption {
    pub name: String,
    pub versioned: bool,
    /// Largest first; empty for unversioned models
    pub versions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectedModel {
    pub model: Option<String>,
    pub version: Option<String>,
    pub evaluate: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelOption>,
    pub selected: Option<SelectedModel>,
    /// Superseded by a newer request; the caller should ignore this answer
    pub aborted: bool,
    pub notification: Option<Notification>,
}

pub fn model_options(catalog: &ModelCatalog) -> Vec<ModelOption> {
    catalog
        .names()
        .iter()
        .map(|name| ModelOption {
            name: name.clone(),
            versioned: catalog.is_versioned(name),
            versions: catalog.versions(name),
        })
        .collect()
}

/// Remembered choice reconciled with what the service offers now.
pub fn reconcile(catalog: &ModelCatalog, stored: &StoredSelection) -> SelectedModel {
    let (model, version) = catalog.reconcile(stored.model.as_deref(), stored.version.as_deref());
    SelectedModel { model, version, evaluate: stored.evaluate }
}

/// GET /api/models?scope=
pub async fn api_models(State(state): State<SharedState>, Query(query): Query<ModelsQuery>) -> Json<ModelsResponse> {
    let stored = match query.scope.as_deref() {
        Some("rt") => state.preferences.selection(SelectionScope::Retrain),
        Some("single") => state.preferences.single_selection(),
        _ => state.preferences.selection(SelectionScope::Classification),
    };

    match state.models.load().await {
        Ok(catalog) => {
            let _ = state.event_tx.send(AppEvent::ModelsLoaded { count: catalog.names().len() });
            Json(ModelsResponse {
                selected: Some(reconcile(&catalog, &stored)),
                models: model_options(&catalog),
                ..Default::default()
            })
        }
        Err(e) if e.is_aborted() => Json(ModelsResponse { aborted: true, ..Default::default() }),
        Err(e) => {
            warn!("Models fetch failed: {}", e);
            Json(ModelsResponse {
                notification: announce(&state, e.to_notification("Models fetch failed")),
                ..Default::default()
            })
        }
    }
}
