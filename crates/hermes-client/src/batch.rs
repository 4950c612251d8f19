//! Batch classification: payload construction and prediction merge.

use std::collections::HashSet;

use hermes_common::columns::{is_allowed, LABEL_COLUMN, PREDICTION_COLUMN};
use hermes_common::document::write_csv;
use hermes_common::{CsvDocument, CsvRow};
use tracing::debug;

use crate::catalog::{ModelCatalog, ModelSelection};
use crate::error::{ApiError, ValidationError};

/// Table projected onto the columns actually sent, with empty rows removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Payload {
    pub fn to_csv(&self) -> hermes_common::Result<String> {
        write_csv(&self.headers, self.rows.iter().map(|r| r.iter().map(String::as_str)))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Cell text as sent: `undefined` / `null` placeholders become empty, the
/// rest is trimmed.
pub fn normalize_cell(value: &str) -> &str {
    match value {
        "undefined" | "null" => "",
        v => v.trim(),
    }
}

/// Allow-listed headers in table order, without `prediction` or repeats.
pub(crate) fn allowed_columns(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .filter(|h| h.as_str() != PREDICTION_COLUMN && is_allowed(h))
        .filter(|h| seen.insert(h.as_str()))
        .cloned()
        .collect()
}

fn project(row: &CsvRow, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|h| normalize_cell(row.get(h).map(String::as_str).unwrap_or("")).to_string())
        .collect()
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(String::is_empty)
}

/// Project `rows` onto `columns`, dropping rows with nothing to send.
pub(crate) fn project_rows(rows: &[CsvRow], columns: &[String]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| project(r, columns))
        .filter(|cells| !is_blank(cells))
        .collect()
}

/// Build the classification upload for `doc`.
///
/// With `evaluate` the table must carry a `label` column, which is sent;
/// otherwise `label` is never sent.
pub fn build_classification_payload(doc: &CsvDocument, evaluate: bool) -> Result<Payload, ValidationError> {
    if doc.rows.is_empty() {
        return Err(ValidationError::NoRows("classify"));
    }

    let mut headers = allowed_columns(&doc.headers);
    if headers.is_empty() {
        return Err(ValidationError::NoAllowedColumns);
    }

    if evaluate {
        if !doc.has_header(LABEL_COLUMN) {
            return Err(ValidationError::MissingLabel("Evaluation"));
        }
    } else {
        headers.retain(|h| h != LABEL_COLUMN);
        if headers.is_empty() {
            return Err(ValidationError::NoAllowedColumns);
        }
    }

    let rows = project_rows(&doc.rows, &headers);
    if rows.is_empty() {
        return Err(ValidationError::EmptyPayload("classify"));
    }

    debug!("Classification payload: {} columns, {} of {} rows", headers.len(), rows.len(), doc.rows.len());
    Ok(Payload { headers, rows })
}

/// Checks that need no model catalog: rows, a model name, then the payload
/// itself. Runs before anything is fetched.
pub fn check_classification(doc: &CsvDocument, model: &str, evaluate: bool) -> Result<Payload, ValidationError> {
    if doc.rows.is_empty() {
        return Err(ValidationError::NoRows("classify"));
    }
    if model.trim().is_empty() {
        return Err(ValidationError::NoModel);
    }
    build_classification_payload(doc, evaluate)
}

/// Validate the model choice and build the payload, reporting problems in
/// the order the user sees them: rows, model, columns, version.
pub fn prepare_classification(
    doc: &CsvDocument,
    catalog: &ModelCatalog,
    model: &str,
    version: Option<&str>,
    evaluate: bool,
) -> Result<(ModelSelection, Payload), ValidationError> {
    let payload = check_classification(doc, model, evaluate)?;
    let selection = catalog.select(model, version, evaluate)?;
    Ok((selection, payload))
}

/// Rows of `doc` that receive `predictions`, re-derived from the live table
/// with the payload's columns.
///
/// If their number no longer matches the predictions (the table changed
/// while the request was in flight), the merge is refused.
pub fn prediction_targets(doc: &CsvDocument, payload: &Payload, predictions: &[String]) -> Result<Vec<usize>, ApiError> {
    let targets: Vec<usize> = doc
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !is_blank(&project(r, &payload.headers)))
        .map(|(i, _)| i)
        .collect();

    if targets.len() != predictions.len() {
        return Err(ApiError::LengthMismatch { got: predictions.len(), expected: targets.len() });
    }
    Ok(targets)
}

/// Write `predictions` onto `targets` positionally. A `prediction` header is
/// appended once.
pub fn apply_predictions(doc: &mut CsvDocument, targets: &[usize], predictions: &[String]) -> usize {
    if !doc.has_header(PREDICTION_COLUMN) {
        doc.headers.push(PREDICTION_COLUMN.to_string());
    }
    for (index, label) in targets.iter().zip(predictions) {
        if let Some(row) = doc.rows.get_mut(*index) {
            row.insert(PREDICTION_COLUMN.to_string(), label.clone());
        }
    }
    targets.len()
}

/// Write `predictions` onto the rows of `doc` that were sent. Unsent rows
/// are left untouched; on a count mismatch nothing is written.
pub fn merge_predictions(doc: &mut CsvDocument, payload: &Payload, predictions: &[String]) -> Result<usize, ApiError> {
    let targets = prediction_targets(doc, payload, predictions)?;
    Ok(apply_predictions(doc, &targets, predictions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(headers: &[&str], rows: &[&[&str]]) -> CsvDocument {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| headers.iter().cloned().zip(cells.iter().map(|c| c.to_string())).collect())
            .collect();
        CsvDocument::new("t.csv", headers, rows)
    }

    #[test]
    fn test_label_stripped_without_evaluation() {
        let d = doc(&["orb_period", "label"], &[&["10", "CONFIRMED"]]);
        let p = build_classification_payload(&d, false).unwrap();
        assert_eq!(p.headers, vec!["orb_period"]);
        assert_eq!(p.rows, vec![vec!["10".to_string()]]);
    }

    #[test]
    fn test_label_sent_with_evaluation() {
        let d = doc(&["label", "orb_period"], &[&["CONFIRMED", "10"]]);
        let p = build_classification_payload(&d, true).unwrap();
        assert_eq!(p.headers, vec!["label", "orb_period"]);
    }

    #[test]
    fn test_evaluation_requires_label() {
        let d = doc(&["orb_period"], &[&["10"]]);
        assert_eq!(
            build_classification_payload(&d, true),
            Err(ValidationError::MissingLabel("Evaluation"))
        );
    }

    #[test]
    fn test_filters_unknown_prediction_and_duplicates() {
        let d = doc(&["", "ra", "notes", "prediction", "ra", "dec"], &[&["1", "2", "x", "p", "2", "3"]]);
        let p = build_classification_payload(&d, false).unwrap();
        assert_eq!(p.headers, vec!["ra", "dec"]);
        assert_eq!(p.to_csv().unwrap(), "ra,dec\n2,3\n");
    }

    #[test]
    fn test_no_allowed_columns() {
        let d = doc(&["notes", "prediction"], &[&["a", "b"]]);
        assert_eq!(build_classification_payload(&d, false), Err(ValidationError::NoAllowedColumns));
        let d = doc(&["label"], &[&["CONFIRMED"]]);
        assert_eq!(build_classification_payload(&d, false), Err(ValidationError::NoAllowedColumns));
    }

    #[test]
    fn test_empty_rows_dropped_and_placeholders_cleared() {
        let d = doc(&["ra", "dec"], &[&["", " "], &["null", "undefined"], &[" 1 ", ""]]);
        let p = build_classification_payload(&d, false).unwrap();
        assert_eq!(p.rows, vec![vec!["1".to_string(), "".to_string()]]);

        let d = doc(&["ra"], &[&[""], &["null"]]);
        assert_eq!(build_classification_payload(&d, false), Err(ValidationError::EmptyPayload("classify")));

        let d = doc(&["ra"], &[]);
        assert_eq!(build_classification_payload(&d, false), Err(ValidationError::NoRows("classify")));
    }

    #[test]
    fn test_prepare_checks_columns_before_version() {
        let catalog = ModelCatalog::from_json(&serde_json::json!({
            "all_models": { "base": ["xgb"], "custom": ["1", "2"] }
        }))
        .unwrap();
        let d = doc(&["notes"], &[&["a"]]);
        assert_eq!(prepare_classification(&d, &catalog, "", None, false), Err(ValidationError::NoModel));
        assert_eq!(
            prepare_classification(&d, &catalog, "custom", None, false),
            Err(ValidationError::NoAllowedColumns)
        );
        let empty = doc(&["ra"], &[]);
        assert_eq!(prepare_classification(&empty, &catalog, "", None, false), Err(ValidationError::NoRows("classify")));

        let ok = doc(&["ra"], &[&["1"]]);
        assert_eq!(prepare_classification(&ok, &catalog, "custom", None, false), Err(ValidationError::NoVersion));
    }

    #[test]
    fn test_check_needs_no_catalog() {
        let d = doc(&["orb_period", "ra"], &[&["1", "2"]]);
        assert_eq!(check_classification(&d, " ", true), Err(ValidationError::NoModel));
        assert_eq!(check_classification(&d, "xgb", true), Err(ValidationError::MissingLabel("Evaluation")));
        assert_eq!(check_classification(&d, "xgb", false).unwrap().headers, vec!["orb_period", "ra"]);
    }

    #[test]
    fn test_merge_annotates_sent_rows_only() {
        let mut d = doc(&["ra", "notes"], &[&["1", "a"], &["", "b"], &["3", "c"]]);
        let p = build_classification_payload(&d, false).unwrap();
        assert_eq!(p.row_count(), 2);

        let merged = merge_predictions(&mut d, &p, &["CONFIRMED".into(), "CANDIDATE".into()]).unwrap();
        assert_eq!(merged, 2);
        assert_eq!(d.headers, vec!["ra", "notes", "prediction"]);
        assert_eq!(d.cell(0, "prediction"), "CONFIRMED");
        assert_eq!(d.cell(1, "prediction"), "");
        assert_eq!(d.cell(1, "notes"), "b");
        assert_eq!(d.cell(2, "prediction"), "CANDIDATE");

        // Second run replaces values without duplicating the header
        merge_predictions(&mut d, &p, &["A".into(), "B".into()]).unwrap();
        assert_eq!(d.headers.iter().filter(|h| *h == "prediction").count(), 1);
        assert_eq!(d.cell(2, "prediction"), "B");
    }

    #[test]
    fn test_merge_count_mismatch_leaves_table_untouched() {
        let mut d = doc(&["ra"], &[&["1"], &["2"]]);
        let p = build_classification_payload(&d, false).unwrap();
        let before = d.clone();

        for preds in [vec!["A".to_string()], vec!["A".into(), "B".into(), "C".into()]] {
            let err = merge_predictions(&mut d, &p, &preds).unwrap_err();
            assert!(matches!(err, ApiError::LengthMismatch { expected: 2, .. }));
            assert_eq!(d, before);
        }
    }
}
