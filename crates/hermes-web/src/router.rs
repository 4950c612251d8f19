//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    pages::{home, upload, template},
    data::{data_page, grid_event, export_csv},
    actions::{classify, retrain, clear_evaluation},
    models::api_models,
    single::{classification_page, classification_submit, shap_csv},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    router(Arc::new(state))
}

/// Router over already shared state.
pub fn router(shared: SharedState) -> Router {
    let static_dir = shared.config.server.static_dir.clone();

    Router::new()
        // Pages
        .route("/",                get(home))
        .route("/upload",          post(upload))
        .route("/template.csv",    get(template))
        .route("/data",            get(data_page))
        .route("/data/{id}/export.csv", get(export_csv))
        .route("/classification",  get(classification_page).post(classification_submit))
        .route("/classification/results/{id}/shap.csv", get(shap_csv))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/models",                    get(api_models))
        .route("/api/data/{id}/events",          post(grid_event))
        .route("/api/data/{id}/classify",        post(classify))
        .route("/api/data/{id}/retrain",         post(retrain))
        .route("/api/data/{id}/evaluation/clear", post(clear_evaluation))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
