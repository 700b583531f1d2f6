//! The connection service handed to downstream consumers.

use crate::account::StorageAccount;
use crate::backend::{AzureBackend, BlobBackend};
use crate::config::ConnectionConfig;
use crate::container::BlobContainer;
use crate::error::{Error, Result};
use crate::{TRACING_TARGET_ACCOUNT, TRACING_TARGET_SERVICE};

/// Shared access to a blob container for downstream components.
///
/// Implementations hold only an immutable configuration snapshot, so one
/// instance can be shared across tasks behind an `Arc`.
#[async_trait::async_trait]
pub trait BlobConnectionService: Send + Sync {
    /// Host-assigned identifier of this service instance.
    fn identifier(&self) -> &str;

    /// Configured container name, exactly as supplied.
    fn container_name(&self) -> &str;

    /// Parses the configured connection string into a fresh account handle.
    fn storage_account(&self) -> Result<StorageAccount>;

    /// Resolves the configured container, failing if it does not exist.
    async fn container_reference(&self) -> Result<BlobContainer>;
}

/// [`BlobConnectionService`] backed by Azure Blob Storage.
///
/// Nothing is cached: each call re-parses the connection string and
/// re-checks the container.
#[derive(Debug, Clone)]
pub struct AzureBlobConnectionService<B = AzureBackend> {
    identifier: String,
    config: ConnectionConfig,
    backend: B,
}

impl AzureBlobConnectionService<AzureBackend> {
    /// Creates a service that talks to Azure Blob Storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration has an empty value.
    pub fn new(identifier: impl Into<String>, config: ConnectionConfig) -> Result<Self> {
        Self::with_backend(identifier, config, AzureBackend)
    }
}

impl<B: BlobBackend + Clone> AzureBlobConnectionService<B> {
    /// Creates a service that opens sessions through `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration has an empty value.
    pub fn with_backend(
        identifier: impl Into<String>,
        config: ConnectionConfig,
        backend: B,
    ) -> Result<Self> {
        config.validate()?;
        let identifier = identifier.into();

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            identifier = %identifier,
            backend = B::ID,
            container = %config.container_name(),
            "Connection service created"
        );

        Ok(Self {
            identifier,
            config,
            backend,
        })
    }

    /// Returns the configuration snapshot.
    #[inline]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl<B: BlobBackend + Clone> BlobConnectionService for AzureBlobConnectionService<B> {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn container_name(&self) -> &str {
        self.config.container_name()
    }

    fn storage_account(&self) -> Result<StorageAccount> {
        StorageAccount::parse(self.config.connection_string()).inspect_err(|err| match err {
            Error::InvalidCredentials(_) => tracing::error!(
                target: TRACING_TARGET_ACCOUNT,
                identifier = %self.identifier,
                error = %err,
                "Connection string specifies an invalid key. Please confirm the AccountName \
                 and AccountKey in the connection string are valid."
            ),
            _ => tracing::error!(
                target: TRACING_TARGET_ACCOUNT,
                identifier = %self.identifier,
                error = %err,
                "Connection string specifies an invalid URI. Please confirm the connection \
                 string is in the Azure connection string format."
            ),
        })
    }

    async fn container_reference(&self) -> Result<BlobContainer> {
        let account = self.storage_account()?;
        let client = account.create_blob_client_with(self.backend.clone());
        let container_name = self.config.container_name();

        match client.resolve_container(container_name).await {
            Ok(container) => {
                tracing::debug!(
                    target: TRACING_TARGET_SERVICE,
                    identifier = %self.identifier,
                    container = %container_name,
                    uri = %container.uri(),
                    "Container resolved"
                );
                Ok(container)
            }
            Err(err @ Error::ContainerNotFound { .. }) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVICE,
                    identifier = %self.identifier,
                    account = %account.account_name(),
                    "Container with name \"{container_name}\" does not exist."
                );
                Err(err)
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVICE,
                    identifier = %self.identifier,
                    container = %container_name,
                    retryable = err.is_retryable(),
                    error = %err,
                    "Failed to resolve container"
                );
                Err(err)
            }
        }
    }
}
