//! Backend trait for opening blob sessions against a storage account.

mod azure;
#[cfg(any(test, feature = "mock"))]
mod memory;

use std::sync::Arc;

pub use azure::AzureBackend;
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub use memory::MemoryBackend;
use object_store::ObjectStore;

use crate::account::StorageAccount;
use crate::error::Result;

/// Factory for blob sessions bound to a single container.
///
/// Implementations turn an authenticated [`StorageAccount`] into an
/// [`ObjectStore`] scoped to one container, and answer whether that
/// container exists. Opening a session never creates the container.
#[async_trait::async_trait]
pub trait BlobBackend: Send + Sync + 'static {
    /// Unique identifier (e.g. "azure", "memory").
    const ID: &'static str;

    /// Opens an unchecked session for `container`.
    ///
    /// No request is sent; the container may not exist.
    fn open(&self, account: &StorageAccount, container: &str) -> Result<Arc<dyn ObjectStore>>;

    /// Checks whether `container` exists, using a session from [`open`](Self::open).
    async fn container_exists(
        &self,
        account: &StorageAccount,
        container: &str,
        store: &dyn ObjectStore,
    ) -> Result<bool>;
}
