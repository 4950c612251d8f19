//! Single-entry classification: feature form, result panel and the
//! contributions download.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use hermes_client::{ClientError, ModelCatalog, ModelSelection, SingleEntryForm, SinglePredictResponse};
use hermes_common::columns::{is_important, FEATURE_GROUPS};
use hermes_common::{Notification, PredictionLabel};
use hermes_config::SelectionScope;
use hermes_explain::{ContributionReport, ResultBadge};
use tracing::{info, warn};

use crate::error::{Result, WebError};
use crate::handlers::models::{model_options, reconcile};
use crate::handlers::{announce, csv_download, remember};
use crate::html::{self, escape, selected};
use crate::state::{AppState, SharedState};
use crate::view::render_contributions;

const MODEL_FIELD: &str = "model";
const VERSION_FIELD: &str = "version";
const ACTION_FIELD: &str = "action";
const OPEN_TABLE: &str = "open_table";

/// Everything the page shows besides the inputs themselves.
#[derive(Default)]
struct PageState {
    catalog: Option<ModelCatalog>,
    model: Option<String>,
    version: Option<String>,
    notice: Option<Notification>,
    result: Option<(String, SinglePredictResponse)>,
}

/// GET /classification
pub async fn classification_page(State(state): State<SharedState>) -> Html<String> {
    let mut page = PageState::default();
    match state.models.current().await {
        Ok(catalog) => {
            let selected = reconcile(&catalog, &state.preferences.single_selection());
            page.model = selected.model;
            page.version = selected.version;
            page.catalog = Some(catalog);
        }
        Err(e) => page.notice = announce(&state, e.to_notification("Models fetch failed")),
    }
    Html(render_page(&SingleEntryForm::new(), &page))
}

/// POST /classification
pub async fn classification_submit(
    State(state): State<SharedState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let mut form = SingleEntryForm::new();
    let mut model = String::new();
    let mut version = None;
    let mut action = String::new();
    for (name, value) in fields {
        match name.as_str() {
            MODEL_FIELD => model = value,
            VERSION_FIELD => version = Some(value).filter(|v| !v.trim().is_empty()),
            ACTION_FIELD => action = value,
            column => form.set_input(column, &value),
        }
    }

    if action == OPEN_TABLE {
        let id = state.csv_store.put(form.to_document());
        info!("Opened single entry as table {}", id);
        return Redirect::to(&format!("/data?id={id}")).into_response();
    }

    let mut page = PageState { model: Some(model.clone()), version: version.clone(), ..Default::default() };
    match run_single(&state, &form, &model, version.as_deref(), &mut page).await {
        Ok((result_id, response)) => {
            page.notice = Some(state.notify(response.notification()));
            page.result = Some((result_id, response));
        }
        Err(e) => {
            if !matches!(e, ClientError::Validation(_)) {
                warn!("Single-entry classification failed: {}", e);
            }
            page.notice = announce(&state, e.to_notification("Classification failed"));
        }
    }
    Html(render_page(&form, &page)).into_response()
}

async fn run_single(
    state: &AppState,
    form: &SingleEntryForm,
    model: &str,
    version: Option<&str>,
    page: &mut PageState,
) -> std::result::Result<(String, SinglePredictResponse), ClientError> {
    let catalog = state.models.current().await?;
    page.catalog = Some(catalog.clone());

    let selection: ModelSelection = catalog.select(model, version, false)?;
    form.validate()?;
    remember(state, SelectionScope::Single, &selection.model, selection.version.as_deref(), false);

    let response = state.api.predict_single(&selection, form).await?;
    let id = state.results.put(response.clone());
    Ok((id, response))
}

/// GET /classification/results/{id}/shap.csv
pub async fn shap_csv(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Response> {
    let response = state.results.get(&id).ok_or_else(|| WebError::UnknownResult(id.clone()))?;
    let report = response.shap_values.as_ref().map(ContributionReport::from_shap).unwrap_or_default();
    let label = PredictionLabel::normalize(&response.prediction);
    Ok(csv_download(&ContributionReport::file_name(label), report.to_csv()?))
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render_page(form: &SingleEntryForm, page: &PageState) -> String {
    let notice = page.notice.as_ref().map(html::notification).unwrap_or_default();
    let missing = form.groups_missing_important();

    let groups: String = FEATURE_GROUPS
        .iter()
        .map(|group| {
            let inputs: String = group
                .columns
                .iter()
                .map(|column| {
                    let marker = if is_important(column) { " *" } else { "" };
                    format!(
                        r#"<label>{}{}<input name="{}" inputmode="decimal" value="{}"></label>"#,
                        escape(column),
                        marker,
                        escape(column),
                        escape(&form.display_value(column))
                    )
                })
                .collect();
            let open = if missing.contains(&group.key) { " open" } else { "" };
            format!(
                r#"<details class="feature-group"{open}><summary>{} <span class="text-muted">{}% influence</span></summary>
<p class="text-muted">{}</p>{}</details>"#,
                escape(group.display_name),
                group.influence,
                escape(group.novice_tip),
                inputs
            )
        })
        .collect();

    let body = format!(r#"
    <div class="page-header">
        <h1 class="page-title">Classify a single candidate</h1>
        <p class="text-muted">Fields marked * are required.</p>
    </div>
    {notice}
    <form method="post" action="/classification" class="card single-entry">
        <div class="model-controls">
            <select name="model" data-scope="single">{models}</select>
            <select name="version">{versions}</select>
        </div>
        {groups}
        <button type="submit" class="btn btn-primary">Classify</button>
        <button type="submit" name="action" value="open_table" class="btn btn-outline">Open as table</button>
    </form>
    {result}"#,
        notice = notice,
        models = model_select(page),
        versions = version_select(page),
        groups = groups,
        result = render_result(page),
    );
    html::page("Single entry", &body)
}

fn model_select(page: &PageState) -> String {
    let Some(catalog) = &page.catalog else {
        return r#"<option value="">No models available</option>"#.to_string();
    };
    model_options(catalog)
        .iter()
        .map(|m| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                escape(&m.name),
                selected(page.model.as_deref() == Some(m.name.as_str()))
            )
        })
        .collect()
}

fn version_select(page: &PageState) -> String {
    let versions = match (&page.catalog, &page.model) {
        (Some(catalog), Some(model)) => catalog.versions(model),
        _ => vec![],
    };
    if versions.is_empty() {
        return r#"<option value="">—</option>"#.to_string();
    }
    versions
        .iter()
        .map(|v| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                escape(v),
                selected(page.version.as_deref() == Some(v.as_str()))
            )
        })
        .collect()
}

fn render_result(page: &PageState) -> String {
    let Some((id, response)) = &page.result else {
        return String::new();
    };
    let badge = ResultBadge::new(&response.prediction, response.shap_values.as_ref());
    let mut extra = String::new();
    if let Some(index) = badge.class_index {
        extra.push_str(&format!(r#"<span class="badge">Class index: {index}</span>"#));
    }
    if let Some(baseline) = &badge.baseline {
        extra.push_str(&format!(r#"<span class="badge badge-outline">Baseline: {baseline}</span>"#));
    }
    let explain = response
        .shap_values
        .as_ref()
        .map(|shap| {
            let report = ContributionReport::from_shap(shap);
            render_contributions(&report, &format!("/classification/results/{id}/shap.csv"))
        })
        .unwrap_or_default();

    format!(
        r#"<div class="card result">
<div class="card-header"><h3>Result</h3><a class="btn btn-sm" href="/classification">Retry new case</a></div>
<span class="badge badge-{}">{}</span>{}
{}
</div>"#,
        badge.color,
        badge.label,
        extra,
        explain
    )
}
