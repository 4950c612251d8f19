//! Data grid page, grid event API and table export.

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use hermes_config::SelectionScope;
use hermes_grid::{CellEdit, GridEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::handlers::csv_download;
use crate::html::{self, checked, escape};
use crate::state::SharedState;
use crate::view::{render_evaluation, GridView};

#[derive(Deserialize)]
pub struct DataQuery {
    pub id: String,
    pub page: Option<usize>,
}

/// GET /data?id=&page=
pub async fn data_page(State(state): State<SharedState>, Query(query): Query<DataQuery>) -> Result<Html<String>> {
    let view = state.with_session(&query.id, |session| {
        if let Some(page) = query.page {
            session.grid.set_page(page);
        }
        GridView::new(&query.id, session)
    })?;

    let cls = state.preferences.selection(SelectionScope::Classification);
    let rt = state.preferences.selection(SelectionScope::Retrain);
    let evaluation = view
        .evaluation
        .as_ref()
        .map(|e| render_evaluation(e, Some(&format!("/api/data/{}/evaluation/clear", view.id))))
        .unwrap_or_default();

    let body = format!(r#"
    <div class="page-header">
        <div>
            <h1 class="page-title">{name}</h1>
            <p class="text-muted">{rows} rows, {cols} columns</p>
        </div>
        <a class="btn btn-outline" href="/data/{id}/export.csv">Export CSV</a>
    </div>
    <div class="card actions" data-id="{id}">
        <div class="action classify">
            <h3>Classify</h3>
            <select name="model" data-scope="cls" data-selected="{cls_model}"></select>
            <select name="version" data-selected="{cls_version}"></select>
            <label><input type="checkbox" name="evaluate"{cls_eval}> Evaluate against label</label>
            <button class="btn btn-primary run-classify">Classify</button>
        </div>
        <div class="action retrain">
            <h3>Retrain</h3>
            <input name="model" placeholder="Target model" value="{rt_model}">
            <input name="version" placeholder="Version (optional)" value="{rt_version}">
            <label><input type="checkbox" name="evaluate"{rt_eval}> Evaluate after training</label>
            <button class="btn btn-outline run-retrain">Retrain</button>
        </div>
    </div>
    <div id="evaluation">{evaluation}</div>
    {grid}"#,
        name = escape(&view.name),
        rows = view.row_count,
        cols = view.headers.len(),
        id = escape(&view.id),
        cls_model = escape(cls.model.as_deref().unwrap_or("")),
        cls_version = escape(cls.version.as_deref().unwrap_or("")),
        cls_eval = checked(cls.evaluate),
        rt_model = escape(rt.model.as_deref().unwrap_or("")),
        rt_version = escape(rt.version.as_deref().unwrap_or("")),
        rt_eval = checked(rt.evaluate),
        evaluation = evaluation,
        grid = view.render(),
    );

    Ok(Html(html::page(&view.name, &body)))
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Cell value committed by the event
    pub edit: Option<CellEdit>,
    pub view: GridView,
    /// Grid markup for the new state
    pub html: String,
}

/// POST /api/data/{id}/events
pub async fn grid_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(event): Json<GridEvent>,
) -> Result<Json<EventResponse>> {
    debug!("Grid event on {}: {:?}", id, event);
    let (edit, view) = state.with_session(&id, |session| {
        let edit = session.grid.apply(event);
        (edit, GridView::new(&id, session))
    })?;
    let html = view.render();
    Ok(Json(EventResponse { edit, view, html }))
}

/// GET /data/{id}/export.csv: the table as currently edited.
pub async fn export_csv(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Response> {
    let document = state.with_session(&id, |session| session.grid.document().clone())?;
    let body = document.to_csv()?;
    Ok(csv_download(&document.export_file_name(), body).into_response())
}
