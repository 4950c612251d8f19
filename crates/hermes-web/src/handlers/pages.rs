//! Home page, CSV upload and the blank template.

use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use hermes_common::columns::template_csv;
use hermes_common::{CsvDocument, Notification};
use tracing::{info, warn};

use crate::handlers::csv_download;
use crate::html::{self, escape};
use crate::state::SharedState;

pub async fn home() -> Html<String> {
    Html(render_home(None))
}

pub async fn template() -> Response {
    csv_download("template.csv", template_csv())
}

/// POST /upload: parse the `file` field, store it and open the grid.
pub async fn upload(State(state): State<SharedState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let name = field.file_name().unwrap_or("data.csv").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((name, bytes.to_vec())),
                    Err(e) => return upload_failed(&state, format!("Could not read the upload: {e}")),
                }
            }
            Ok(None) => break,
            Err(e) => return upload_failed(&state, format!("Could not read the upload: {e}")),
        }
    }

    let Some((name, bytes)) = upload.filter(|(_, b)| !b.is_empty()) else {
        return upload_failed(&state, "Choose a CSV file to upload.".to_string());
    };

    match CsvDocument::parse(name.as_str(), &bytes) {
        Ok(document) => {
            let rows = document.rows.len();
            let id = state.csv_store.put(document);
            info!("Stored upload {} as {} ({} rows)", name, id, rows);
            Redirect::to(&format!("/data?id={id}")).into_response()
        }
        Err(e) => upload_failed(&state, format!("{name} is not a readable CSV file: {e}")),
    }
}

fn upload_failed(state: &SharedState, message: String) -> Response {
    warn!("Upload rejected: {}", message);
    let notice = state.notify(Notification::error("Upload failed", message));
    Html(render_home(Some(&notice))).into_response()
}

fn render_home(notice: Option<&Notification>) -> String {
    let notice = notice.map(html::notification).unwrap_or_default();
    let body = format!(r#"
    <div class="page-header">
        <h1 class="page-title">Exoplanet candidate classification</h1>
        <p class="text-muted">Upload a CSV of candidate features, edit it in the grid, then classify or retrain.</p>
    </div>
    {notice}
    <div class="card">
        <form action="/upload" method="post" enctype="multipart/form-data">
            <input type="file" name="file" accept=".csv,text/csv" required>
            <button type="submit" class="btn btn-primary">Upload</button>
        </form>
        <p class="text-muted">Need the expected columns? <a href="/template.csv">{}</a> or <a href="/classification">enter one candidate by hand</a>.</p>
    </div>"#, escape("Download the blank template"));
    html::page("Upload", &body)
}
