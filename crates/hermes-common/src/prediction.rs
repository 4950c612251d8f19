//! Prediction labels, SHAP payloads and evaluation summaries returned by the
//! classification service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Label ─────────────────────────────────────────────────────────────────────

/// Closed set of dispositions shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionLabel {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl PredictionLabel {
    /// Map a raw service label onto the closed set. Anything that is not
    /// recognisably confirmed or a false positive is a candidate.
    pub fn normalize(raw: &str) -> Self {
        let norm = raw.to_lowercase();
        if norm.contains("confirm") {
            PredictionLabel::Confirmed
        } else if norm.contains("false") {
            PredictionLabel::FalsePositive
        } else {
            PredictionLabel::Candidate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLabel::Confirmed     => "Confirmed",
            PredictionLabel::Candidate     => "Candidate",
            PredictionLabel::FalsePositive => "False Positive",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PredictionLabel::Confirmed     => "teal",
            PredictionLabel::Candidate     => "yellow",
            PredictionLabel::FalsePositive => "red",
        }
    }
}

impl std::fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SHAP ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapValues {
    pub class_index: i64,
    pub base_value: f64,
    pub per_feature: BTreeMap<String, f64>,
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// One report row. A metric the service left out (or sent as a non-number)
/// is `None` and shows as a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    #[serde(rename = "f1-score")]
    pub f1_score: Option<f64>,
    pub support: Option<f64>,
}

impl LabelMetrics {
    fn from_object(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_f64);
        Self {
            precision: field("precision"),
            recall: field("recall"),
            f1_score: field("f1-score"),
            support: field("support"),
        }
    }
}

/// Classification report: per-label metrics in display order plus accuracy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub accuracy: Option<f64>,
    pub per_label: Vec<(String, LabelMetrics)>,
}

const AVERAGE_ROWS: [&str; 2] = ["macro avg", "weighted avg"];

impl EvaluationSummary {
    /// Build from a report object of the form
    /// `{ "<label>": { precision, recall, f1-score, support }, "accuracy": n }`.
    ///
    /// Every object entry becomes a row, even with metrics missing; other
    /// non-`accuracy` entries are ignored. Averages are moved after class
    /// labels.
    pub fn from_report(report: &Value) -> Option<Self> {
        let obj = report.as_object()?;

        let accuracy = obj.get("accuracy").and_then(Value::as_f64);

        let mut labels = Vec::new();
        let mut averages = Vec::new();
        for (key, value) in obj {
            if key == "accuracy" || !value.is_object() {
                continue;
            }
            let metrics = LabelMetrics::from_object(value);
            if AVERAGE_ROWS.contains(&key.as_str()) {
                averages.push((key.clone(), metrics));
            } else {
                labels.push((key.clone(), metrics));
            }
        }
        averages.sort_by_key(|(k, _)| AVERAGE_ROWS.iter().position(|a| a == k));
        labels.extend(averages);

        Some(Self { accuracy, per_label: labels })
    }

    pub fn metrics(&self, label: &str) -> Option<&LabelMetrics> {
        self.per_label.iter().find(|(l, _)| l == label).map(|(_, m)| m)
    }
}
