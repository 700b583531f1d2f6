//! In-memory backend for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use object_store::ObjectStore;
use object_store::memory::InMemory;

use super::BlobBackend;
use crate::account::StorageAccount;
use crate::error::Result;

/// Backend holding a fixed set of named in-memory containers.
///
/// Unknown containers do not exist; opening one yields a detached, empty
/// store so that callers see the same "unchecked reference" behaviour as
/// the real service. The account is ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    containers: HashMap<String, Arc<InMemory>>,
    opened: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Creates a backend with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty container named `name`.
    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.containers
            .entry(name.into())
            .or_insert_with(|| Arc::new(InMemory::new()));
        self
    }

    /// Returns the names of the known containers.
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }

    /// Returns how many sessions have been opened, across clones.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl BlobBackend for MemoryBackend {
    const ID: &'static str = "memory";

    fn open(&self, _account: &StorageAccount, container: &str) -> Result<Arc<dyn ObjectStore>> {
        self.opened.fetch_add(1, Ordering::Relaxed);
        let store: Arc<dyn ObjectStore> = match self.containers.get(container) {
            Some(store) => store.clone(),
            None => Arc::new(InMemory::new()),
        };
        Ok(store)
    }

    async fn container_exists(
        &self,
        _account: &StorageAccount,
        container: &str,
        _store: &dyn ObjectStore,
    ) -> Result<bool> {
        Ok(self.containers.contains_key(container))
    }
}
