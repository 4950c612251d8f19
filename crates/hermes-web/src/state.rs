//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use hermes_client::{ClassifierApi, HermesClient, ModelsLoader, SinglePredictResponse};
use hermes_common::{CsvDocument, CsvStore, EvaluationSummary, MemoryStore, Notification, NotificationLevel};
use hermes_config::{Config, PreferenceStore};
use hermes_grid::DataGrid;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Result, WebError};

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// User-facing notice from a flow
    Notification { level: NotificationLevel, title: String, message: String },
    /// Table content changed outside the grid (prediction merge)
    TableUpdated { id: String, rows: usize },
    /// Model list refreshed
    ModelsLoaded { count: usize },
}

/// One open data page: the grid over a copy of the uploaded document and the
/// last evaluation report shown with it.
#[derive(Debug, Clone)]
pub struct DataSession {
    pub grid: DataGrid,
    pub evaluation: Option<EvaluationSummary>,
}

impl DataSession {
    pub fn new(document: CsvDocument, page_size: usize) -> Self {
        Self { grid: DataGrid::new(document, page_size), evaluation: None }
    }
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    /// Uploaded documents as parsed
    pub csv_store: CsvStore,
    /// Open grids, keyed by the document id they were opened from
    pub sessions: MemoryStore<DataSession>,
    /// Single-entry results, kept for the contributions download
    pub results: MemoryStore<SinglePredictResponse>,
    pub api: Arc<dyn ClassifierApi>,
    pub models: ModelsLoader,
    pub preferences: PreferenceStore,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn ClassifierApi>, preferences: PreferenceStore) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            csv_store: CsvStore::new("csv"),
            sessions: MemoryStore::new("session"),
            results: MemoryStore::new("result"),
            models: ModelsLoader::new(Arc::clone(&api)),
            api,
            preferences,
            event_tx,
        }
    }

    /// State backed by the real HTTP client and file preferences.
    pub fn from_config(config: Config) -> hermes_client::error::Result<Self> {
        let timeout = config.api.timeout_secs.map(Duration::from_secs);
        let client = HermesClient::with_timeout(config.api.base_url.clone(), timeout)?;
        let preferences = PreferenceStore::open(&config.preferences.path);
        Ok(Self::new(config, Arc::new(client), preferences))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Broadcast `notification` and hand it back for the inline response.
    pub fn notify(&self, notification: Notification) -> Notification {
        let _ = self.event_tx.send(AppEvent::Notification {
            level: notification.level,
            title: notification.title.clone(),
            message: notification.message.clone(),
        });
        notification
    }

    /// Make sure a grid session exists for document `id`, opening one from
    /// the CSV store on first access.
    pub fn ensure_session(&self, id: &str) -> Result<()> {
        if self.sessions.contains(id) {
            return Ok(());
        }
        let document = self
            .csv_store
            .get(id)
            .ok_or_else(|| WebError::UnknownTable(id.to_string()))?;
        debug!("Opening grid session for {} ({} rows)", id, document.rows.len());
        self.sessions.insert(id, DataSession::new(document, self.config.grid.page_size));
        Ok(())
    }

    /// Run `f` against the session of document `id`.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut DataSession) -> R) -> Result<R> {
        self.ensure_session(id)?;
        self.sessions
            .update(id, f)
            .ok_or_else(|| WebError::UnknownTable(id.to_string()))
    }
}

pub type SharedState = Arc<AppState>;
