//! Connector for the in-memory backend

use crate::memory::MemoryStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use whimbrel_core::{ConnectionOptions, KeyValueStore, StoreConnector, StoreResult};

/// Hands out one shared [`MemoryStore`] on every connect.
///
/// Connection options are accepted and ignored. The connect counter lets
/// callers observe how often the client layer actually connected.
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    /// Wrap an existing store
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            connects: AtomicUsize::new(0),
        }
    }

    /// The store handed out by this connector
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Number of successful connects so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::Acquire)
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for MemoryConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnector")
            .field("store", &self.store)
            .field("connects", &self.connect_count())
            .finish()
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, options: &ConnectionOptions) -> StoreResult<Arc<dyn KeyValueStore>> {
        let n = self.connects.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(connects = n, options = ?options.present_keys(), "connected in-memory store");
        Ok(Arc::clone(&self.store) as Arc<dyn KeyValueStore>)
    }
}
