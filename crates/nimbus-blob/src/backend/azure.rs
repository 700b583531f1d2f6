//! Azure Blob Storage backend using [`object_store::azure::MicrosoftAzureBuilder`].

use std::sync::Arc;

use object_store::ObjectStore;
use object_store::azure::MicrosoftAzureBuilder;

use super::BlobBackend;
use crate::TRACING_TARGET_CONTAINER;
use crate::account::{StorageAccount, StorageCredentials};
use crate::error::Result;

/// Error code the blob service returns for a missing container.
const CONTAINER_NOT_FOUND_CODE: &str = "ContainerNotFound";

/// Blob sessions against Azure Blob Storage (or a compatible emulator).
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureBackend;

#[async_trait::async_trait]
impl BlobBackend for AzureBackend {
    const ID: &'static str = "azure";

    fn open(&self, account: &StorageAccount, container: &str) -> Result<Arc<dyn ObjectStore>> {
        let endpoint = account.blob_endpoint();
        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(account.account_name())
            .with_container_name(container)
            .with_endpoint(endpoint.as_str().trim_end_matches('/').to_owned());

        if endpoint.scheme() == "http" {
            builder = builder.with_allow_http(true);
        }

        builder = match account.credentials() {
            StorageCredentials::SharedKey(key) => builder.with_access_key(key.as_base64()),
            StorageCredentials::SasToken(sas) => {
                builder.with_sas_authorization(sas.query_pairs().to_vec())
            }
        };

        let store = builder.build()?;
        Ok(Arc::new(store))
    }

    async fn container_exists(
        &self,
        _account: &StorageAccount,
        container: &str,
        store: &dyn ObjectStore,
    ) -> Result<bool> {
        // Root listing addresses the container, not a blob in it.
        match store.list_with_delimiter(None).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) if err.to_string().contains(CONTAINER_NOT_FOUND_CODE) => Ok(false),
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET_CONTAINER,
                    container = %container,
                    error = %err,
                    "Container existence probe failed"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_builds_without_network() {
        let account = StorageAccount::parse(
            "AccountName=acct;AccountKey=c2VjcmV0LWtleQ==;EndpointSuffix=core.windows.net",
        )
        .unwrap();
        assert!(AzureBackend.open(&account, "logs").is_ok());
    }

    #[test]
    fn open_emulator_and_sas_accounts() {
        let emulator = StorageAccount::parse("UseDevelopmentStorage=true").unwrap();
        assert!(AzureBackend.open(&emulator, "logs").is_ok());

        let sas = StorageAccount::parse(
            "BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=2022-11-02&sig=abc",
        )
        .unwrap();
        assert!(AzureBackend.open(&sas, "logs").is_ok());
    }
}
