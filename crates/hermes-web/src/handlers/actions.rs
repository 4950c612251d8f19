//! Classify and retrain the table of a data session.
//!
//! The table is snapshotted under the session lock, the remote call runs
//! without any lock held, and results are written back afterwards.

use axum::extract::{Path, State};
use axum::Json;
use hermes_client::{
    apply_predictions, check_classification, prediction_targets, prepare_retrain, ApiError, ClientError, Payload,
    PredictResponse, RetrainTarget,
};
use hermes_common::Notification;
use hermes_config::SelectionScope;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::handlers::{announce, remember};
use crate::state::{AppEvent, AppState, DataSession, SharedState};
use crate::view::GridView;

const CLASSIFY_FAILED: &str = "Classification failed";
const RETRAIN_FAILED: &str = "Retrain failed";

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub model: String,
    pub version: Option<String>,
    #[serde(default)]
    pub evaluate: bool,
}

#[derive(Debug, Deserialize)]
pub struct RetrainRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub evaluate: bool,
}

/// Outcome of an action: the notice to show (none for superseded requests)
/// and the grid after any merge.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub notification: Option<Notification>,
    pub view: GridView,
    pub html: String,
}

fn respond(state: &AppState, id: &str, notification: Option<Notification>) -> Result<Json<ActionResponse>> {
    let view = state.with_session(id, |session| GridView::new(id, session))?;
    let html = view.render();
    Ok(Json(ActionResponse { notification: announce(state, notification), view, html }))
}

/// POST /api/data/{id}/classify
pub async fn classify(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ActionResponse>> {
    let document = state.with_session(&id, |session| session.grid.document().clone())?;

    let notification = match run_classify(&state, &id, document, request).await {
        Ok(notice) => Some(notice),
        Err(e) => {
            if !matches!(e, ClientError::Validation(_)) {
                warn!("Classification of {} failed: {}", id, e);
            }
            e.to_notification(CLASSIFY_FAILED)
        }
    };
    respond(&state, &id, notification)
}

async fn run_classify(
    state: &AppState,
    id: &str,
    document: hermes_common::CsvDocument,
    request: ClassifyRequest,
) -> std::result::Result<Notification, ClientError> {
    let payload = check_classification(&document, &request.model, request.evaluate)?;
    let catalog = state.models.current().await?;
    let selection = catalog.select(&request.model, request.version.as_deref(), request.evaluate)?;
    remember(state, SelectionScope::Classification, &selection.model, selection.version.as_deref(), selection.evaluate);

    let response = state.api.predict_batch(&selection, &payload).await?;

    let merged = state
        .sessions
        .update(id, |session| merge_into(session, &payload, &response))
        .ok_or_else(|| ApiError::Task(format!("table {id} is no longer open")))??;

    info!("Merged {} predictions into {}", merged, id);
    let _ = state.event_tx.send(AppEvent::TableUpdated { id: id.to_string(), rows: merged });
    Ok(response.notification(payload.row_count()))
}

/// Merge a batch response into the session. A refused merge leaves the grid,
/// including any open edit, as it was.
fn merge_into(session: &mut DataSession, payload: &Payload, response: &PredictResponse) -> std::result::Result<usize, ApiError> {
    let targets = prediction_targets(session.grid.document(), payload, &response.prediction)?;
    let merged = apply_predictions(session.grid.document_mut(), &targets, &response.prediction);
    if let Some(evaluation) = &response.evaluation {
        session.evaluation = Some(evaluation.clone());
    }
    Ok(merged)
}

/// POST /api/data/{id}/retrain
pub async fn retrain(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<RetrainRequest>,
) -> Result<Json<ActionResponse>> {
    let document = state.with_session(&id, |session| session.grid.document().clone())?;

    let target = RetrainTarget { model: request.model, version: request.version, evaluate: request.evaluate };
    let notification = match run_retrain(&state, &id, document, target).await {
        Ok(notice) => Some(notice),
        Err(e) => {
            if !matches!(e, ClientError::Validation(_)) {
                warn!("Retrain from {} failed: {}", id, e);
            }
            e.to_notification(RETRAIN_FAILED)
        }
    };
    respond(&state, &id, notification)
}

async fn run_retrain(
    state: &AppState,
    id: &str,
    document: hermes_common::CsvDocument,
    target: RetrainTarget,
) -> std::result::Result<Notification, ClientError> {
    let (selection, payload) = prepare_retrain(&document, &target)?;
    remember(state, SelectionScope::Retrain, &selection.model, selection.version.as_deref(), selection.evaluate);

    let response = state.api.retrain(&selection, &payload).await?;
    if let Some(evaluation) = &response.evaluation {
        state.sessions.update(id, |session| session.evaluation = Some(evaluation.clone()));
    }
    Ok(response.notification(&selection))
}

/// POST /api/data/{id}/evaluation/clear
pub async fn clear_evaluation(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<ActionResponse>> {
    state.with_session(&id, |session| session.evaluation = None)?;
    respond(&state, &id, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_common::CsvDocument;
    use hermes_grid::GridEvent;
    use pretty_assertions::assert_eq;

    fn session() -> (DataSession, Payload) {
        let doc = CsvDocument::parse("t.csv", b"ra,notes\n1,a\n,b\n3,c\n").unwrap();
        let payload = Payload { headers: vec!["ra".into()], rows: vec![vec!["1".into()], vec!["3".into()]] };
        (DataSession::new(doc, 30), payload)
    }

    fn response(labels: &[&str]) -> PredictResponse {
        PredictResponse {
            prediction: labels.iter().map(|l| l.to_string()).collect(),
            rows: None,
            model_version: None,
            evaluation: None,
        }
    }

    #[test]
    fn test_refused_merge_keeps_open_edit() {
        let (mut session, payload) = session();
        session.grid.apply(GridEvent::CellClick { row: 1, col: 1 });
        assert!(session.grid.editor().editing().is_some());

        let err = merge_into(&mut session, &payload, &response(&["CONFIRMED"])).unwrap_err();
        assert!(matches!(err, ApiError::LengthMismatch { got: 1, expected: 2 }));
        assert!(session.grid.editor().editing().is_some());
        assert!(!session.grid.document().has_header("prediction"));
    }

    #[test]
    fn test_merge_annotates_sent_rows() {
        let (mut session, payload) = session();
        let merged = merge_into(&mut session, &payload, &response(&["CONFIRMED", "CANDIDATE"])).unwrap();
        assert_eq!(merged, 2);
        let doc = session.grid.document();
        assert_eq!(doc.rows[0].get("prediction").map(String::as_str), Some("CONFIRMED"));
        assert_eq!(doc.rows[1].get("prediction"), None);
        assert_eq!(doc.rows[2].get("prediction").map(String::as_str), Some("CANDIDATE"));
    }
}
