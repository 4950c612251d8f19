//! Model catalog from `GET /api/v1/models/all/` and model selection rules.
//!
//! The service answers `{ all_models: { base: [name, ...], <model>: [version, ...] } }`.
//! Selectable names are the `base` entries followed by every other key. A
//! model is versioned only when it lists versions and all of them are plain
//! digit strings; those versions are offered newest (largest) first.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result, ValidationError};
use crate::wire::scalar_text;

const BASE_KEY: &str = "base";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelCatalog {
    names: Vec<String>,
    versions: HashMap<String, Vec<String>>,
}

impl ModelCatalog {
    pub fn from_json(body: &Value) -> Result<Self> {
        let all = body
            .get("all_models")
            .and_then(Value::as_object)
            .ok_or_else(|| ApiError::MalformedResponse("all_models is missing".to_string()))?;

        let list = |v: &Value| -> Vec<String> {
            v.as_array()
                .map(|items| items.iter().filter_map(scalar_text).collect())
                .unwrap_or_default()
        };

        let mut names = all.get(BASE_KEY).map(list).unwrap_or_default();
        let mut versions = HashMap::new();
        for (key, value) in all.iter().filter(|(k, _)| k.as_str() != BASE_KEY) {
            names.push(key.clone());
            versions.insert(key.clone(), list(value));
        }

        Ok(Self { names, versions })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.names.iter().any(|n| n == model)
    }

    pub fn is_versioned(&self, model: &str) -> bool {
        self.versions
            .get(model)
            .is_some_and(|v| !v.is_empty() && v.iter().all(|s| is_digits(s)))
    }

    /// Selectable versions of `model`, largest first. Empty when unversioned.
    pub fn versions(&self, model: &str) -> Vec<String> {
        if !self.is_versioned(model) {
            return vec![];
        }
        let mut out = self.versions.get(model).cloned().unwrap_or_default();
        out.sort_by(|a, b| cmp_digits(b, a));
        out
    }

    /// Reconcile a remembered choice with the catalog: an unknown model falls
    /// back to the first listed one; a version survives only if the model
    /// still offers it.
    pub fn reconcile(&self, model: Option<&str>, version: Option<&str>) -> (Option<String>, Option<String>) {
        let Some(first) = self.names.first() else {
            return (None, None);
        };
        let model = model.filter(|m| self.contains(m)).unwrap_or(first).to_string();
        let version = version
            .filter(|v| self.versions(&model).iter().any(|known| known == v))
            .map(str::to_string);
        (Some(model), version)
    }

    /// Validate a user's choice. `version` is forwarded only for versioned
    /// models.
    pub fn select(&self, model: &str, version: Option<&str>, evaluate: bool) -> std::result::Result<ModelSelection, ValidationError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ValidationError::NoModel);
        }
        let version = version.map(str::trim).filter(|v| !v.is_empty());
        let version = if self.is_versioned(model) {
            Some(version.ok_or(ValidationError::NoVersion)?.to_string())
        } else {
            None
        };
        Ok(ModelSelection { model: model.to_string(), version, evaluate })
    }
}

/// Validated model choice for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSelection {
    pub model: String,
    pub version: Option<String>,
    pub evaluate: bool,
}

impl ModelSelection {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into(), version: None, evaluate: false }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    /// Query parameters: `model`, then `version` and `evaluate=true` when set.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![("model", self.model.clone())];
        if let Some(v) = &self.version {
            q.push(("version", v.clone()));
        }
        if self.evaluate {
            q.push(("evaluate", "true".to_string()));
        }
        q
    }

    /// `name` or `name@version`.
    pub fn display(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.model, v),
            None => self.model.clone(),
        }
    }
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric comparison of digit strings of any length.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
