//! Error type for connection, account and container resolution.

/// Specialized [`Result`] type for blob connection operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the connection service.
///
/// None of these are fatal to the process; each one fails the single call
/// that produced it.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// A required configuration property is missing or empty.
    #[error("invalid configuration for '{property}': {reason}")]
    InvalidConfig {
        /// Descriptor name of the offending property.
        property: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The connection string is not a syntactically valid descriptor.
    ///
    /// This covers bad segments, unknown settings and endpoint URIs that
    /// fail to parse.
    #[error("malformed connection string: {0}")]
    MalformedConnectionString(String),

    /// The connection string parses but its account key is unusable.
    #[error("invalid storage credentials: {0}")]
    InvalidCredentials(String),

    /// The configured container does not exist in the storage account.
    #[error("container with name \"{container}\" does not exist")]
    ContainerNotFound {
        /// Name of the missing container.
        container: String,
    },

    /// A blob inside the container does not exist.
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// The service was used in a lifecycle state that does not allow it.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Transport or service error from the underlying blob client.
    #[error("storage error: {0}")]
    Storage(#[from] object_store::Error),
}

impl Error {
    /// Creates a new configuration error for `property`.
    pub fn invalid_config(property: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            property,
            reason: reason.into(),
        }
    }

    /// Creates a new malformed connection string error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedConnectionString(msg.into())
    }

    /// Creates a new invalid credentials error.
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    /// Creates a new container not found error.
    pub fn container_not_found(container: impl Into<String>) -> Self {
        Self::ContainerNotFound {
            container: container.into(),
        }
    }

    /// Creates a new lifecycle error.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Returns whether this error needs an operator to fix the configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. }
                | Error::MalformedConnectionString(_)
                | Error::InvalidCredentials(_)
        )
    }

    /// Returns whether the caller may retry the operation unchanged.
    ///
    /// Only transport failures qualify. Configuration problems, missing
    /// resources and authorization failures stay failed until an operator
    /// intervenes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Storage(err) => !matches!(
                err,
                object_store::Error::NotFound { .. }
                    | object_store::Error::PermissionDenied { .. }
                    | object_store::Error::Unauthenticated { .. }
                    | object_store::Error::AlreadyExists { .. }
                    | object_store::Error::Precondition { .. }
                    | object_store::Error::NotSupported { .. }
                    | object_store::Error::NotImplemented
            ),
            Error::InvalidConfig { .. }
            | Error::MalformedConnectionString(_)
            | Error::InvalidCredentials(_)
            | Error::ContainerNotFound { .. }
            | Error::BlobNotFound(_)
            | Error::Lifecycle(_) => false,
        }
    }
}
