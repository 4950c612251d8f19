//! Single-entry classification form: one value per feature column.

use std::collections::BTreeMap;

use hermes_common::columns::{feature_columns, is_allowed, is_flag_column, IMPORTANT_HEADERS, FEATURE_GROUPS};
use hermes_common::{CsvDocument, CsvRow};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Number(n) => n,
            FieldValue::Bool(b) => if b { 1.0 } else { 0.0 },
        }
    }

    /// Cell text for the synthesized table.
    pub fn to_cell(&self) -> String {
        match *self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => (if b { "1" } else { "0" }).to_string(),
        }
    }
}

/// Values keyed by column; an absent key is an empty field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SingleEntryForm {
    inputs: BTreeMap<String, FieldValue>,
}

impl SingleEntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field from its text input. Unparseable or empty text clears the
    /// field. Flag columns are rounded and clamped to 0 or 1.
    pub fn set_input(&mut self, column: &str, raw: &str) {
        let parsed = raw.trim().parse::<f64>().ok().filter(|n| n.is_finite());
        match parsed {
            None => {
                self.inputs.remove(column);
            }
            Some(n) => {
                let n = if is_flag_column(column) { n.round().clamp(0.0, 1.0) } else { n };
                self.inputs.insert(column.to_string(), FieldValue::Number(n));
            }
        }
    }

    pub fn set_bool(&mut self, column: &str, value: bool) {
        self.inputs.insert(column.to_string(), FieldValue::Bool(value));
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn get(&self, column: &str) -> Option<FieldValue> {
        self.inputs.get(column).copied()
    }

    /// Input text for rendering the form back.
    pub fn display_value(&self, column: &str) -> String {
        self.get(column).map(|v| v.to_cell()).unwrap_or_default()
    }

    /// Important columns still empty, in catalog order.
    pub fn missing_important(&self) -> Vec<String> {
        IMPORTANT_HEADERS
            .iter()
            .filter(|h| !self.inputs.contains_key(**h))
            .map(|h| h.to_string())
            .collect()
    }

    /// Keys of feature groups holding at least one empty important column.
    pub fn groups_missing_important(&self) -> Vec<&'static str> {
        FEATURE_GROUPS
            .iter()
            .filter(|g| {
                g.columns
                    .iter()
                    .any(|c| IMPORTANT_HEADERS.contains(c) && !self.inputs.contains_key(*c))
            })
            .map(|g| g.key)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_important();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingImportant(missing))
        }
    }

    /// Allow-listed, filled features as numbers.
    pub fn payload(&self) -> BTreeMap<String, f64> {
        self.inputs
            .iter()
            .filter(|(k, _)| is_allowed(k))
            .map(|(k, v)| (k.clone(), v.as_f64()))
            .collect()
    }

    /// Request body for `POST /api/v1/predict/single/`.
    pub fn request_body(&self) -> Value {
        json!({ "data": self.payload() })
    }

    /// One-row table over every feature column, empty where unset.
    pub fn to_document(&self) -> CsvDocument {
        let headers: Vec<String> = feature_columns().into_iter().map(str::to_string).collect();
        let row: CsvRow = headers
            .iter()
            .map(|h| (h.clone(), self.display_value(h)))
            .collect();
        CsvDocument::new("single-entry.csv", headers, vec![row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> SingleEntryForm {
        let mut form = SingleEntryForm::new();
        for (i, h) in IMPORTANT_HEADERS.iter().enumerate() {
            form.set_input(h, &i.to_string());
        }
        form
    }

    #[test]
    fn test_flag_columns_clamp() {
        let mut form = SingleEntryForm::new();
        form.set_input("koi_fpflag_nt", "0.7");
        form.set_input("ttv_flag", "5");
        form.set_input("default_flag", "-3");
        assert_eq!(form.get("koi_fpflag_nt"), Some(FieldValue::Number(1.0)));
        assert_eq!(form.get("ttv_flag"), Some(FieldValue::Number(1.0)));
        assert_eq!(form.get("default_flag"), Some(FieldValue::Number(0.0)));
    }

    #[test]
    fn test_empty_or_garbage_clears() {
        let mut form = SingleEntryForm::new();
        form.set_input("ra", "12");
        form.set_input("ra", "abc");
        assert_eq!(form.get("ra"), None);
        form.set_input("ra", "NaN");
        assert_eq!(form.get("ra"), None);
    }

    #[test]
    fn test_missing_important_preview_order() {
        let mut form = SingleEntryForm::new();
        form.set_input("orb_period", "0");
        let missing = form.missing_important();
        assert_eq!(missing.len(), IMPORTANT_HEADERS.len() - 1);
        assert_eq!(missing[0], "orb_period_err1");
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill these before classifying: orb_period_err1, orb_period_err2, planet_radius, \
             planet_radius_err1, planet_radius_err2, star_teff…"
        );
        assert!(form.groups_missing_important().contains(&"orbit"));
    }

    #[test]
    fn test_zero_counts_as_filled() {
        let mut form = filled();
        form.set_input("ra", "0");
        assert!(form.validate().is_ok());
        assert!(form.groups_missing_important().is_empty());
    }

    #[test]
    fn test_payload_allowed_only_bools_as_numbers() {
        let mut form = filled();
        form.set_bool("koi_fpflag_co", true);
        form.set_input("not_a_feature", "3");
        let payload = form.payload();
        assert_eq!(payload["koi_fpflag_co"], 1.0);
        assert!(!payload.contains_key("not_a_feature"));
        assert_eq!(form.request_body()["data"]["dec"], 16.0);
    }

    #[test]
    fn test_to_document_single_row() {
        let mut form = SingleEntryForm::new();
        form.set_input("orb_period", "3.5");
        form.set_input("ra", "290");
        let doc = form.to_document();
        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.headers.len(), feature_columns().len());
        assert_eq!(doc.cell(0, "orb_period"), "3.5");
        assert_eq!(doc.cell(0, "ra"), "290");
        assert_eq!(doc.cell(0, "dec"), "");
    }
}
