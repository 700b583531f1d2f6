#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_ACCOUNT: &str = "nimbus_blob::account";
pub const TRACING_TARGET_CONTAINER: &str = "nimbus_blob::container";
pub const TRACING_TARGET_SERVICE: &str = "nimbus_blob::service";
pub const TRACING_TARGET_LIFECYCLE: &str = "nimbus_blob::lifecycle";

pub mod account;
pub mod backend;
pub mod client;
pub mod config;
pub mod connection_string;
pub mod container;
mod error;
pub mod lifecycle;
pub mod service;

#[doc(hidden)]
pub mod prelude;

pub use crate::account::{StorageAccount, StorageCredentials};
#[cfg(any(test, feature = "mock"))]
pub use crate::backend::MemoryBackend;
pub use crate::backend::{AzureBackend, BlobBackend};
pub use crate::client::BlobServiceClient;
pub use crate::config::{ConnectionConfig, ConnectionProperty};
pub use crate::container::{BlobContainer, GetOutput, PutOutput};
pub use crate::error::{Error, Result};
pub use crate::lifecycle::{LifecycleState, ServiceLifecycle};
pub use crate::service::{AzureBlobConnectionService, BlobConnectionService};
