//! Host lifecycle for the connection service.
//!
//! ```text
//! Uninitialized -> Initialized -> Enabled <-> Disabled
//! ```
//!
//! A host calls [`ServiceLifecycle::initialize`] once with the identifier it
//! assigned, then [`enable`](ServiceLifecycle::enable) with its property bag.
//! Consumers obtain the running service through
//! [`service`](ServiceLifecycle::service). Disabling drops the service; the
//! next enable builds a new one from a fresh configuration.

use std::collections::HashMap;
use std::sync::Arc;

use strum::Display;

use crate::TRACING_TARGET_LIFECYCLE;
use crate::backend::{AzureBackend, BlobBackend};
use crate::config::{ConnectionConfig, ConnectionProperty};
use crate::error::{Error, Result};
use crate::service::{AzureBlobConnectionService, BlobConnectionService};

/// Lifecycle state of a managed connection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleState {
    /// Created, no identifier yet.
    Uninitialized,
    /// Identifier bound, not configured.
    Initialized,
    /// Configured and serving.
    Enabled,
    /// Configuration dropped by the host.
    Disabled,
}

/// Drives a connection service through the host's lifecycle hooks.
#[derive(Debug)]
pub struct ServiceLifecycle<B = AzureBackend> {
    state: LifecycleState,
    identifier: Option<String>,
    backend: B,
    service: Option<Arc<AzureBlobConnectionService<B>>>,
}

impl ServiceLifecycle<AzureBackend> {
    /// Creates an uninitialized lifecycle backed by Azure Blob Storage.
    pub fn new() -> Self {
        Self::with_backend(AzureBackend)
    }
}

impl Default for ServiceLifecycle<AzureBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlobBackend + Clone> ServiceLifecycle<B> {
    /// Creates an uninitialized lifecycle that opens sessions through `backend`.
    pub fn with_backend(backend: B) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            identifier: None,
            backend,
            service: None,
        }
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the bound identifier, once initialized.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Properties the host must supply to [`enable`](Self::enable).
    pub fn supported_properties(&self) -> &'static [ConnectionProperty] {
        &ConnectionProperty::ALL
    }

    /// Binds the host-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless the lifecycle is uninitialized.
    pub fn initialize(&mut self, identifier: impl Into<String>) -> Result<()> {
        self.expect_state(&[LifecycleState::Uninitialized], "initialize")?;

        let identifier = identifier.into();
        tracing::info!(
            target: TRACING_TARGET_LIFECYCLE,
            identifier = %identifier,
            "Connection service initialized"
        );

        self.identifier = Some(identifier);
        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Captures the host property bag and starts serving.
    ///
    /// A failed enable leaves the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] when called before initialization or
    /// while already enabled, and [`Error::InvalidConfig`] for missing or
    /// empty properties.
    pub fn enable(
        &mut self,
        properties: &HashMap<String, String>,
    ) -> Result<Arc<AzureBlobConnectionService<B>>> {
        self.expect_state(
            &[LifecycleState::Initialized, LifecycleState::Disabled],
            "enable",
        )?;
        let config = ConnectionConfig::from_properties(properties)?;
        self.enable_with(config)
    }

    /// Starts serving with an already built configuration.
    ///
    /// # Errors
    ///
    /// Same as [`enable`](Self::enable).
    pub fn enable_with(
        &mut self,
        config: ConnectionConfig,
    ) -> Result<Arc<AzureBlobConnectionService<B>>> {
        self.expect_state(
            &[LifecycleState::Initialized, LifecycleState::Disabled],
            "enable",
        )?;

        let identifier = self.identifier.clone().unwrap_or_default();
        let service = Arc::new(AzureBlobConnectionService::with_backend(
            identifier,
            config,
            self.backend.clone(),
        )?);

        tracing::info!(
            target: TRACING_TARGET_LIFECYCLE,
            identifier = %service.identifier(),
            container = %service.config().container_name(),
            backend = B::ID,
            "Connection service enabled"
        );

        self.service = Some(Arc::clone(&service));
        self.state = LifecycleState::Enabled;
        Ok(service)
    }

    /// Stops serving and drops the configuration.
    ///
    /// Handles already given to consumers stay usable until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless the lifecycle is enabled.
    pub fn disable(&mut self) -> Result<()> {
        self.expect_state(&[LifecycleState::Enabled], "disable")?;

        self.service = None;
        self.state = LifecycleState::Disabled;

        tracing::info!(
            target: TRACING_TARGET_LIFECYCLE,
            identifier = ?self.identifier,
            "Connection service disabled"
        );
        Ok(())
    }

    /// Returns the running service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless the lifecycle is enabled.
    pub fn service(&self) -> Result<Arc<AzureBlobConnectionService<B>>> {
        self.service.clone().ok_or_else(|| {
            Error::lifecycle(format!("service is {}, not enabled", self.state))
        })
    }

    fn expect_state(&self, allowed: &[LifecycleState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET_LIFECYCLE,
            state = %self.state,
            operation,
            "Lifecycle transition rejected"
        );
        Err(Error::lifecycle(format!(
            "cannot {operation} a service that is {}",
            self.state
        )))
    }
}
