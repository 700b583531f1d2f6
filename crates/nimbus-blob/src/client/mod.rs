//! Blob service client bound to one storage account.

use crate::TRACING_TARGET_CONTAINER;
use crate::account::StorageAccount;
use crate::backend::{AzureBackend, BlobBackend};
use crate::container::BlobContainer;
use crate::error::{Error, Result};

/// Client session for the blob service of a [`StorageAccount`].
///
/// Created by [`StorageAccount::create_blob_client`]. Building the client
/// sends no requests.
#[derive(Debug, Clone)]
pub struct BlobServiceClient<B = AzureBackend> {
    account: StorageAccount,
    backend: B,
}

impl<B: BlobBackend> BlobServiceClient<B> {
    /// Binds `account` to `backend`.
    pub fn new(account: StorageAccount, backend: B) -> Self {
        Self { account, backend }
    }

    /// Returns the account this client talks to.
    #[inline]
    pub fn account(&self) -> &StorageAccount {
        &self.account
    }

    /// Returns an unchecked reference to `container`.
    ///
    /// The container may not exist; use [`resolve_container`](Self::resolve_container)
    /// for an existence-checked handle.
    pub fn get_container_reference(&self, container: &str) -> Result<BlobContainer> {
        let store = self.backend.open(&self.account, container)?;
        Ok(BlobContainer::new(
            container,
            self.account.container_uri(container),
            store,
        ))
    }

    /// Checks whether `container` exists in the account.
    pub async fn container_exists(&self, container: &str) -> Result<bool> {
        let reference = self.get_container_reference(container)?;
        self.backend
            .container_exists(&self.account, container, reference.store())
            .await
    }

    /// Resolves `container`, failing if it does not exist.
    ///
    /// The container is never created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerNotFound`] if the container is absent, or
    /// [`Error::Storage`] if the existence check itself fails.
    pub async fn resolve_container(&self, container: &str) -> Result<BlobContainer> {
        let reference = self.get_container_reference(container)?;

        let exists = self
            .backend
            .container_exists(&self.account, container, reference.store())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_CONTAINER,
            backend = B::ID,
            account = %self.account.account_name(),
            container = %container,
            exists,
            "Container existence check completed"
        );

        if !exists {
            return Err(Error::container_not_found(container));
        }

        Ok(reference)
    }
}
