//! Retraining upload.

use hermes_common::columns::LABEL_COLUMN;
use hermes_common::CsvDocument;
use serde::Serialize;

use crate::batch::{allowed_columns, project_rows, Payload};
use crate::catalog::ModelSelection;
use crate::error::ValidationError;

/// Free-text retrain target as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetrainTarget {
    pub model: String,
    pub version: String,
    pub evaluate: bool,
}

impl RetrainTarget {
    /// Target model name is required; version is optional.
    pub fn selection(&self) -> Result<ModelSelection, ValidationError> {
        let model = self.model.trim();
        if model.is_empty() {
            return Err(ValidationError::MissingTargetModel);
        }
        let mut selection = ModelSelection::new(model).with_evaluate(self.evaluate);
        let version = self.version.trim();
        if !version.is_empty() {
            selection = selection.with_version(version);
        }
        Ok(selection)
    }
}

/// Build the training upload: allow-listed columns with `label` always
/// included, empty rows dropped.
pub fn build_retrain_payload(doc: &CsvDocument) -> Result<Payload, ValidationError> {
    if doc.rows.is_empty() {
        return Err(ValidationError::NoRows("retrain with"));
    }
    if !doc.has_header(LABEL_COLUMN) {
        return Err(ValidationError::MissingLabel("Retraining"));
    }

    let headers = allowed_columns(&doc.headers);
    let rows = project_rows(&doc.rows, &headers);
    if rows.is_empty() {
        return Err(ValidationError::EmptyPayload("retrain with"));
    }
    Ok(Payload { headers, rows })
}

/// Validate target and table in the order the user sees them reported.
pub fn prepare_retrain(doc: &CsvDocument, target: &RetrainTarget) -> Result<(ModelSelection, Payload), ValidationError> {
    if doc.rows.is_empty() {
        return Err(ValidationError::NoRows("retrain with"));
    }
    let selection = target.selection()?;
    let payload = build_retrain_payload(doc)?;
    Ok((selection, payload))
}
