//! Last-request-wins model list loading.
//!
//! Each [`ModelsLoader::load`] aborts the fetch still in flight from an
//! earlier call. The superseded caller receives [`ApiError::Aborted`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::AbortHandle;
use tracing::debug;

use crate::catalog::ModelCatalog;
use crate::client::ClassifierApi;
use crate::error::{ApiError, Result};

pub struct ModelsLoader {
    api: Arc<dyn ClassifierApi>,
    generation: AtomicU64,
    inflight: Mutex<Option<(u64, AbortHandle)>>,
    latest: RwLock<Option<ModelCatalog>>,
}

impl ModelsLoader {
    pub fn new(api: Arc<dyn ClassifierApi>) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            latest: RwLock::new(None),
        }
    }

    pub async fn load(&self) -> Result<ModelCatalog> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move { api.fetch_models().await });

        let previous = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((generation, task.abort_handle()));
        if let Some((superseded, handle)) = previous {
            debug!("Aborting models fetch #{} in favour of #{}", superseded, generation);
            handle.abort();
        }

        let joined = task.await;

        {
            let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            if inflight.as_ref().is_some_and(|(g, _)| *g == generation) {
                *inflight = None;
            }
        }

        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => return Err(ApiError::Aborted),
            Err(e) => return Err(ApiError::Task(e.to_string())),
        };
        self.settle(generation, result)
    }

    /// Publish the outcome of fetch `generation`. A newer load may have
    /// started after the fetch finished but before this point; the older
    /// result is then dropped as aborted and never reaches the cache.
    fn settle(&self, generation: u64, result: Result<ModelCatalog>) -> Result<ModelCatalog> {
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping stale models fetch #{}", generation);
            return Err(ApiError::Aborted);
        }
        let catalog = result?;
        *latest = Some(catalog.clone());
        Ok(catalog)
    }

    /// Catalog from the last successful load.
    pub fn cached(&self) -> Option<ModelCatalog> {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Cached catalog, loading it when nothing has been fetched yet.
    pub async fn current(&self) -> Result<ModelCatalog> {
        match self.cached() {
            Some(catalog) => Ok(catalog),
            None => self.load().await,
        }
    }
}
