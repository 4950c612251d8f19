//! Display-ready views of evaluation reports and prediction badges.

use hermes_common::{EvaluationSummary, PredictionLabel, ShapValues};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRow {
    pub label: String,
    pub precision: String,
    pub recall: String,
    pub f1_score: String,
    pub support: String,
}

/// Evaluation table: accuracy badge text and one formatted row per label,
/// averages last.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationView {
    pub accuracy: Option<String>,
    pub rows: Vec<EvaluationRow>,
}

impl EvaluationView {
    pub fn new(summary: &EvaluationSummary) -> Self {
        let rows = summary
            .per_label
            .iter()
            .map(|(label, m)| EvaluationRow {
                label: label.clone(),
                precision: metric(m.precision),
                recall: metric(m.recall),
                f1_score: metric(m.f1_score),
                support: m.support.map(|s| s.to_string()).unwrap_or_default(),
            })
            .collect();

        Self {
            accuracy: summary.accuracy.map(|a| format!("accuracy: {:.2}%", a * 100.0)),
            rows,
        }
    }
}

fn metric(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

/// Header of the single-entry result: normalized label with its color, plus
/// SHAP class index and baseline when the service sent them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBadge {
    pub label: PredictionLabel,
    pub color: &'static str,
    pub class_index: Option<i64>,
    pub baseline: Option<String>,
}

impl ResultBadge {
    pub fn new(raw_prediction: &str, shap: Option<&ShapValues>) -> Self {
        let label = PredictionLabel::normalize(raw_prediction);
        Self {
            label,
            color: label.color(),
            class_index: shap.map(|s| s.class_index),
            baseline: shap.map(|s| format!("{:.4}", s.base_value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_view_formats_metrics_and_accuracy() {
        let summary = EvaluationSummary::from_report(&json!({
            "weighted avg": { "precision": 0.5, "recall": 0.5, "f1-score": 0.5, "support": 4 },
            "CONFIRMED": { "precision": 0.91234, "recall": 0.8, "f1-score": 0.85, "support": 4 },
            "accuracy": 0.86666
        }))
        .unwrap();

        let view = EvaluationView::new(&summary);
        assert_eq!(view.accuracy.as_deref(), Some("accuracy: 86.67%"));
        assert_eq!(
            view.rows[0],
            EvaluationRow {
                label: "CONFIRMED".into(),
                precision: "0.912".into(),
                recall: "0.800".into(),
                f1_score: "0.850".into(),
                support: "4".into(),
            }
        );
        assert_eq!(view.rows[1].label, "weighted avg");
    }

    #[test]
    fn test_missing_metric_is_blank() {
        let summary = EvaluationSummary::from_report(&json!({
            "FALSE POSITIVE": { "precision": 0.5, "support": 3 }
        }))
        .unwrap();
        assert_eq!(
            EvaluationView::new(&summary).rows,
            vec![EvaluationRow {
                label: "FALSE POSITIVE".into(),
                precision: "0.500".into(),
                recall: String::new(),
                f1_score: String::new(),
                support: "3".into(),
            }]
        );
    }

    #[test]
    fn test_view_without_accuracy() {
        let view = EvaluationView::new(&EvaluationSummary::default());
        assert!(view.accuracy.is_none());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_badge_normalizes_label() {
        let shap = ShapValues { class_index: 2, base_value: 0.123456, per_feature: Default::default() };
        let badge = ResultBadge::new("FALSE POSITIVE", Some(&shap));
        assert_eq!(badge.label, PredictionLabel::FalsePositive);
        assert_eq!(badge.color, "red");
        assert_eq!(badge.class_index, Some(2));
        assert_eq!(badge.baseline.as_deref(), Some("0.1235"));

        let badge = ResultBadge::new("something else", None);
        assert_eq!(badge.label, PredictionLabel::Candidate);
        assert_eq!(badge.baseline, None);
    }
}
