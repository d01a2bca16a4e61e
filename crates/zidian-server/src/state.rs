//! Shared handler state

use std::sync::Arc;

use zidian_core::{FsrsScheduler, Scheduler, Storage};

use crate::api::ApiError;

/// Shared application state for the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl AppState {
    /// State with the default FSRS scheduler
    pub fn new(storage: Arc<Storage>) -> Self {
        Self::with_scheduler(storage, Arc::new(FsrsScheduler::default()))
    }

    pub fn with_scheduler(storage: Arc<Storage>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { storage, scheduler }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// SQLite calls hold a connection mutex and do file I/O, so they stay off
    /// the async worker threads.
    pub async fn blocking<F, T>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Storage, &dyn Scheduler) -> zidian_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let scheduler = Arc::clone(&self.scheduler);

        tokio::task::spawn_blocking(move || op(&storage, scheduler.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
