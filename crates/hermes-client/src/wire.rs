//! Per-endpoint response types, validated from raw JSON at the boundary.

use hermes_common::{EvaluationSummary, Notification, ShapValues};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::ModelSelection;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub prediction: Vec<String>,
    pub rows: Option<u64>,
    pub model_version: Option<String>,
    pub evaluation: Option<EvaluationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePredictResponse {
    pub prediction: String,
    pub shap_values: Option<ShapValues>,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrainResponse {
    pub message: Option<String>,
    pub model: Option<String>,
    pub model_version: Option<String>,
    pub rows: Option<u64>,
    pub evaluation: Option<EvaluationSummary>,
}

fn as_object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ApiError::MalformedResponse("expected a JSON object".to_string()))
}

/// Text form of a scalar: strings verbatim, numbers and booleans printed.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn evaluation(obj: &Map<String, Value>) -> Option<EvaluationSummary> {
    obj.get("evaluation").and_then(EvaluationSummary::from_report)
}

impl PredictResponse {
    /// Validate a batch response against the number of rows sent.
    pub fn from_json(body: &Value, expected_rows: usize) -> Result<Self> {
        let obj = as_object(body)?;
        let prediction = obj
            .get("prediction")
            .and_then(Value::as_array)
            .ok_or(ApiError::PredictionNotArray)?;
        if prediction.len() != expected_rows {
            return Err(ApiError::LengthMismatch { got: prediction.len(), expected: expected_rows });
        }

        Ok(Self {
            prediction: prediction.iter().map(|v| scalar_text(v).unwrap_or_default()).collect(),
            rows: obj.get("rows").and_then(Value::as_u64),
            model_version: obj.get("model_version").and_then(scalar_text),
            evaluation: evaluation(obj),
        })
    }
}

impl SinglePredictResponse {
    pub fn from_json(body: &Value) -> Result<Self> {
        let obj = as_object(body)?;
        let prediction = obj.get("prediction").and_then(scalar_text).unwrap_or_default();

        let shap_values = match obj.get("shap_values") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                serde_json::from_value::<ShapValues>(v.clone())
                    .map_err(|e| ApiError::MalformedResponse(format!("shap_values: {e}")))?,
            ),
        };

        Ok(Self {
            prediction,
            shap_values,
            model_version: obj.get("model_version").and_then(scalar_text),
        })
    }
}

impl RetrainResponse {
    pub fn from_json(body: &Value) -> Result<Self> {
        let obj = as_object(body)?;
        Ok(Self {
            message: obj.get("message").and_then(Value::as_str).map(str::to_string),
            model: obj.get("model").and_then(scalar_text),
            model_version: obj.get("model_version").and_then(scalar_text),
            rows: obj.get("rows").and_then(Value::as_u64),
            evaluation: evaluation(obj),
        })
    }
}

// ── Success notices ───────────────────────────────────────────────────────────

fn model_suffix(model_version: Option<&str>) -> String {
    model_version.map(|v| format!(" (model {v})")).unwrap_or_default()
}

impl PredictResponse {
    pub fn notification(&self, sent_rows: usize) -> Notification {
        let rows = self.rows.map(|r| r as usize).unwrap_or(sent_rows);
        Notification::success(
            "Classification complete",
            format!("Predicted {} rows{}.", rows, model_suffix(self.model_version.as_deref())),
        )
    }
}

impl SinglePredictResponse {
    pub fn notification(&self) -> Notification {
        Notification::success(
            "Classification complete",
            format!("Predicted: {}{}.", self.prediction, model_suffix(self.model_version.as_deref())),
        )
    }
}

impl RetrainResponse {
    pub fn notification(&self, selection: &ModelSelection) -> Notification {
        let message = self.message.clone().unwrap_or_else(|| {
            let eval = if selection.evaluate { " (with evaluation)" } else { "" };
            format!("Retrain {}{} started.", selection.display(), eval)
        });
        Notification::success("Retrain submitted", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predict_validates_array_and_length() {
        let ok = PredictResponse::from_json(
            &json!({ "prediction": ["CONFIRMED", 1], "rows": 2, "model_version": 7 }),
            2,
        )
        .unwrap();
        assert_eq!(ok.prediction, vec!["CONFIRMED", "1"]);
        assert_eq!(ok.model_version.as_deref(), Some("7"));
        assert!(ok.evaluation.is_none());

        assert!(matches!(
            PredictResponse::from_json(&json!({ "prediction": "CONFIRMED" }), 1),
            Err(ApiError::PredictionNotArray)
        ));
        assert!(matches!(
            PredictResponse::from_json(&json!({ "prediction": ["a"] }), 2),
            Err(ApiError::LengthMismatch { got: 1, expected: 2 })
        ));
        assert!(matches!(
            PredictResponse::from_json(&json!([1]), 1),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_single_with_shap() {
        let r = SinglePredictResponse::from_json(&json!({
            "prediction": "FALSE POSITIVE",
            "shap_values": { "class_index": 2, "base_value": 0.1, "per_feature": { "ra": -0.3 } }
        }))
        .unwrap();
        assert_eq!(r.prediction, "FALSE POSITIVE");
        assert_eq!(r.shap_values.unwrap().per_feature["ra"], -0.3);
        assert!(SinglePredictResponse::from_json(&json!({ "shap_values": { "x": 1 } })).is_err());
    }

    #[test]
    fn test_success_messages() {
        let r = PredictResponse::from_json(&json!({ "prediction": ["a", "b"], "model_version": "3" }), 2).unwrap();
        assert_eq!(r.notification(2).message, "Predicted 2 rows (model 3).");

        let r = RetrainResponse::default();
        let sel = ModelSelection::new("mine").with_version("4").with_evaluate(true);
        assert_eq!(r.notification(&sel).message, "Retrain mine@4 (with evaluation) started.");
    }

    #[test]
    fn test_retrain_optional_fields() {
        let r = RetrainResponse::from_json(&json!({})).unwrap();
        assert_eq!(r, RetrainResponse::default());
        let r = RetrainResponse::from_json(&json!({ "message": "queued", "rows": 40 })).unwrap();
        assert_eq!(r.message.as_deref(), Some("queued"));
        assert_eq!(r.rows, Some(40));
    }
}
