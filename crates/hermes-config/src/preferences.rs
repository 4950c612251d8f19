//! Persisted UI preferences: a flat JSON object of string keys to string
//! values, rewritten on every change.
//!
//! Model selections are stored per flow under a short prefix
//! (`cls:model`, `rt:version`, ...).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::Result;

#[derive(Debug, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl PreferenceStore {
    /// Open the store backed by `path`. A missing or unreadable file starts
    /// empty; only writes report errors.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!("Preferences: {} keys from {}", values.len(), path.display());
        Self { path: Some(path), values: RwLock::new(values) }
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        self.set_many([(key, value.into())])
    }

    /// Update several keys with one file write.
    pub fn set_many<'a>(&self, entries: impl IntoIterator<Item = (&'a str, String)>) -> Result<()> {
        let snapshot = {
            let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
            for (k, v) in entries {
                values.insert(k.to_string(), v);
            }
            values.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }

    // ── Model selections ──────────────────────────────────────────────────────

    pub fn selection(&self, scope: SelectionScope) -> StoredSelection {
        let read = |field: &str| self.get(&scope.key(field)).filter(|v| !v.is_empty());
        StoredSelection {
            model: read("model"),
            version: read("version"),
            evaluate: read("evaluate").as_deref() == Some("true"),
        }
    }

    /// Selection for the single-entry panel: the classification keys, with
    /// the panel's own keys as fallback.
    pub fn single_selection(&self) -> StoredSelection {
        let cls = self.selection(SelectionScope::Classification);
        let single = self.selection(SelectionScope::Single);
        StoredSelection {
            model: cls.model.or(single.model),
            version: cls.version.or(single.version),
            evaluate: false,
        }
    }

    pub fn save_selection(&self, scope: SelectionScope, selection: &StoredSelection) -> Result<()> {
        let model = selection.model.clone().unwrap_or_default();
        let version = selection.version.clone().unwrap_or_default();
        match scope {
            SelectionScope::Single => self.set_many([
                ("cls:model", model.clone()),
                ("cls:version", version.clone()),
                ("single:model", model),
                ("single:version", version),
            ]),
            _ => {
                let keys = [scope.key("model"), scope.key("version"), scope.key("evaluate")];
                self.set_many([
                    (keys[0].as_str(), model),
                    (keys[1].as_str(), version),
                    (keys[2].as_str(), selection.evaluate.to_string()),
                ])
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionScope {
    Classification,
    Retrain,
    Single,
}

impl SelectionScope {
    pub fn prefix(&self) -> &'static str {
        match self {
            SelectionScope::Classification => "cls",
            SelectionScope::Retrain        => "rt",
            SelectionScope::Single         => "single",
        }
    }

    fn key(&self, field: &str) -> String {
        format!("{}:{}", self.prefix(), field)
    }
}

/// Last model/version/evaluate choice of one flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSelection {
    pub model: Option<String>,
    pub version: Option<String>,
    pub evaluate: bool,
}
