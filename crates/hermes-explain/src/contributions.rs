//! Contribution ranking for a single-entry prediction.
//!
//! Features are ordered by absolute contribution, largest first. Equal
//! magnitudes keep their input order. Positive values support the predicted
//! class ("helpful"), negative values oppose it ("harmful").

use std::cmp::Ordering;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use hermes_common::{PredictionLabel, Result, ShapValues};
use serde::Serialize;
use tracing::debug;

/// Entries shown in each of the helpful / harmful lists.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: String,
    pub value: f64,
}

impl Contribution {
    /// Value as shown in the helpful / harmful lists.
    pub fn short(&self) -> String {
        format!("{:.3}", self.value)
    }

    /// Value as shown in the full table.
    pub fn precise(&self) -> String {
        format!("{:.6}", self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContributionReport {
    ranked: Vec<Contribution>,
}

impl ContributionReport {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut ranked: Vec<Contribution> = values
            .into_iter()
            .map(|(feature, value)| Contribution { feature: feature.into(), value })
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.value.abs().partial_cmp(&a.value.abs()).unwrap_or(Ordering::Equal));
        debug!("Ranked {} feature contributions", ranked.len());
        Self { ranked }
    }

    pub fn from_shap(shap: &ShapValues) -> Self {
        Self::new(shap.per_feature.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn ranked(&self) -> &[Contribution] {
        &self.ranked
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn helpful(&self) -> Vec<&Contribution> {
        self.ranked.iter().filter(|c| c.value > 0.0).take(TOP_N).collect()
    }

    pub fn harmful(&self) -> Vec<&Contribution> {
        self.ranked.iter().filter(|c| c.value < 0.0).take(TOP_N).collect()
    }

    /// `feature,contribution` rows in ranked order. Every field is quoted and
    /// records are CRLF-separated.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());

        writer.write_record(["feature", "contribution"])?;
        for c in &self.ranked {
            writer.write_record([c.feature.as_str(), c.value.to_string().as_str()])?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        let mut text = String::from_utf8(bytes).map_err(|_| hermes_common::HermesError::Encoding)?;
        if text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        }
        Ok(text)
    }

    pub fn file_name(label: PredictionLabel) -> String {
        format!("shap_contributions_{}.csv", label.as_str().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features(report: &[&Contribution]) -> Vec<String> {
        report.iter().map(|c| c.feature.clone()).collect()
    }

    #[test]
    fn test_helpful_and_harmful_split() {
        let report = ContributionReport::new([("star_teff", 0.8), ("ra", -0.3), ("dec", 0.1)]);
        assert_eq!(features(&report.helpful()), vec!["star_teff", "dec"]);
        assert_eq!(features(&report.harmful()), vec!["ra"]);
        let order: Vec<&str> = report.ranked().iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(order, vec!["star_teff", "ra", "dec"]);
    }

    #[test]
    fn test_zero_is_neither_and_lists_cap_at_five() {
        let values: Vec<(String, f64)> = (1..=7)
            .map(|i| (format!("p{i}"), i as f64))
            .chain([("zero".to_string(), 0.0)])
            .collect();
        let report = ContributionReport::new(values);
        assert_eq!(features(&report.helpful()), vec!["p7", "p6", "p5", "p4", "p3"]);
        assert!(report.harmful().is_empty());
        assert_eq!(report.ranked().last().unwrap().feature, "zero");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let report = ContributionReport::new([("b", -0.5), ("a", 0.5), ("c", 0.5)]);
        let order: Vec<&str> = report.ranked().iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let report = ContributionReport::new([("ra", -0.3), ("odd\"name", 0.8)]);
        assert_eq!(
            report.to_csv().unwrap(),
            "\"feature\",\"contribution\"\r\n\"odd\"\"name\",\"0.8\"\r\n\"ra\",\"-0.3\""
        );
    }

    #[test]
    fn test_file_name_uses_lowercased_label() {
        assert_eq!(
            ContributionReport::file_name(PredictionLabel::FalsePositive),
            "shap_contributions_false positive.csv"
        );
        assert_eq!(ContributionReport::file_name(PredictionLabel::Confirmed), "shap_contributions_confirmed.csv");
    }

    #[test]
    fn test_display_precision() {
        let c = Contribution { feature: "ra".into(), value: -0.123456789 };
        assert_eq!(c.short(), "-0.123");
        assert_eq!(c.precise(), "-0.123457");
    }
}
