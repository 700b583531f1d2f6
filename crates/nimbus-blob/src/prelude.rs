//! Convenience re-exports.

pub use crate::account::{StorageAccount, StorageCredentials};
#[cfg(any(test, feature = "mock"))]
pub use crate::backend::MemoryBackend;
pub use crate::backend::{AzureBackend, BlobBackend};
pub use crate::client::BlobServiceClient;
pub use crate::config::{ConnectionConfig, ConnectionProperty};
pub use crate::container::BlobContainer;
pub use crate::error::{Error, Result};
pub use crate::lifecycle::{LifecycleState, ServiceLifecycle};
pub use crate::service::{AzureBlobConnectionService, BlobConnectionService};
