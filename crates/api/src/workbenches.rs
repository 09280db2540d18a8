//! Open workbenches, cached per company and month.
//!
//! Each entry sits behind a `tokio::sync::Mutex`, so one request at a time owns a workbench.
//! Idle entries expire and are re-fetched on the next request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use rentbook_core::rents::{RentPeriod, RentWorkbench};
use rentbook_shared::config::WorkbenchConfig;
use rentbook_shared::types::CompanyId;

use crate::error::ApiError;

/// Cache key: one workbench per company and month.
pub type WorkbenchKey = (CompanyId, RentPeriod);

/// Shared handle to an open workbench.
pub type SharedWorkbench = Arc<Mutex<RentWorkbench>>;

/// Cache of open workbenches.
#[derive(Clone)]
pub struct WorkbenchStore {
    cache: Cache<WorkbenchKey, SharedWorkbench>,
}

impl WorkbenchStore {
    /// Creates a store with the configured capacity and idle timeout.
    #[must_use]
    pub fn new(config: &WorkbenchConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(Duration::from_secs(config.idle_secs))
            .build();

        Self { cache }
    }

    /// Returns the open workbench for the key, opening it with `open` if needed.
    ///
    /// Concurrent callers for the same key share a single `open` call.
    ///
    /// # Errors
    ///
    /// Returns the error from `open`.
    pub async fn get_or_open<F>(&self, key: WorkbenchKey, open: F) -> Result<SharedWorkbench, ApiError>
    where
        F: Future<Output = Result<RentWorkbench, ApiError>>,
    {
        self.cache
            .try_get_with(key, async move { open.await.map(|wb| Arc::new(Mutex::new(wb))) })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Number of cached workbenches. Approximate until pending cache maintenance runs.
    #[must_use]
    pub fn open_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drops a workbench, discarding its unsaved edits.
    pub async fn close(&self, key: &WorkbenchKey) {
        self.cache.invalidate(key).await;
    }
}
