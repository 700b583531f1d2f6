//! Connection configuration and its property schema.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

use crate::error::{Error, Result};

/// A configurable property of the connection service.
///
/// The host supplies values keyed by [`name`](Self::name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, EnumIter)]
pub enum ConnectionProperty {
    /// Name of the blob container to resolve.
    #[strum(serialize = "Azure Storage container name")]
    ContainerName,
    /// Storage account connection string.
    #[strum(serialize = "Azure Storage container connection string")]
    ConnectionString,
}

impl ConnectionProperty {
    /// Every supported property, in presentation order.
    pub const ALL: [ConnectionProperty; 2] = [Self::ContainerName, Self::ConnectionString];

    /// Returns the descriptor name used as the property key.
    pub fn name(self) -> &'static str {
        match self {
            Self::ContainerName => "Azure Storage container name",
            Self::ConnectionString => "Azure Storage container connection string",
        }
    }

    /// Returns operator-facing help text.
    pub fn description(self) -> &'static str {
        match self {
            Self::ContainerName => {
                "The name of the storage container as provided by Azure portal."
            }
            Self::ConnectionString => {
                "The connection string for the storage container as provided by Azure portal. \
                 Example: DefaultEndpointsProtocol=https;AccountName=my_storage_account_name;\
                 AccountKey=my_storage_account_key;BlobEndpoint=https://my_storage_account.blob.core.windows.net/"
            }
        }
    }

    /// Returns whether the property must be set.
    pub fn is_required(self) -> bool {
        true
    }

    /// Returns whether the value is secret and must not be logged.
    pub fn is_sensitive(self) -> bool {
        matches!(self, Self::ConnectionString)
    }
}

impl fmt::Display for ConnectionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Validated connection settings.
///
/// Immutable once built; a reconfiguration replaces the whole value.
/// Values are kept verbatim, without trimming.
///
/// Serialization omits the connection string. Deserialization goes through
/// [`ConnectionConfig::new`], so empty values are rejected.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase", try_from = "RawConnectionConfig")]
pub struct ConnectionConfig {
    /// Storage account connection string.
    #[serde(skip_serializing)]
    #[cfg_attr(
        feature = "config",
        arg(
            long = "connection-string",
            env = "AZURE_STORAGE_CONNECTION_STRING",
            hide_env_values = true
        )
    )]
    connection_string: String,

    /// Name of the blob container.
    #[cfg_attr(
        feature = "config",
        arg(long = "container-name", env = "AZURE_STORAGE_CONTAINER_NAME")
    )]
    container_name: String,
}

/// Unvalidated wire form of [`ConnectionConfig`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConnectionConfig {
    connection_string: String,
    container_name: String,
}

impl TryFrom<RawConnectionConfig> for ConnectionConfig {
    type Error = Error;

    fn try_from(raw: RawConnectionConfig) -> Result<Self> {
        Self::new(raw.connection_string, raw.container_name)
    }
}

impl ConnectionConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either value is empty.
    pub fn new(
        connection_string: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            connection_string: connection_string.into(),
            container_name: container_name.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from a host property bag keyed by descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first missing or empty property.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let lookup = |property: ConnectionProperty| -> Result<String> {
            properties
                .get(property.name())
                .cloned()
                .ok_or_else(|| Error::invalid_config(property.name(), "is required"))
        };

        let container_name = lookup(ConnectionProperty::ContainerName)?;
        let connection_string = lookup(ConnectionProperty::ConnectionString)?;
        Self::new(connection_string, container_name)
    }

    /// Checks that both values are non-empty.
    pub fn validate(&self) -> Result<()> {
        for property in ConnectionProperty::ALL {
            if self.value(property).is_empty() {
                return Err(Error::invalid_config(property.name(), "must not be empty"));
            }
        }
        Ok(())
    }

    /// Returns the value of `property`.
    pub fn value(&self, property: ConnectionProperty) -> &str {
        match property {
            ConnectionProperty::ContainerName => &self.container_name,
            ConnectionProperty::ConnectionString => &self.connection_string,
        }
    }

    /// Returns the connection string.
    #[inline]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Returns the container name.
    #[inline]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ConnectionConfig");
        for property in ConnectionProperty::ALL {
            let field = match property {
                ConnectionProperty::ContainerName => "container_name",
                ConnectionProperty::ConnectionString => "connection_string",
            };
            if property.is_sensitive() {
                debug.field(field, &"***");
            } else {
                debug.field(field, &self.value(property));
            }
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn properties(pairs: &[(ConnectionProperty, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(p, v)| (p.name().to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn property_names_match_descriptors() {
        for property in ConnectionProperty::iter() {
            assert_eq!(property.as_ref(), property.name());
            assert!(property.is_required());
            assert!(!property.description().is_empty());
        }
        assert_eq!(ConnectionProperty::iter().count(), ConnectionProperty::ALL.len());
    }

    #[test]
    fn new_rejects_empty_values() {
        let err = ConnectionConfig::new("", "invoices").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig { property, .. } if property == ConnectionProperty::ConnectionString.name()
        ));

        let err = ConnectionConfig::new("UseDevelopmentStorage=true", "").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig { property, .. } if property == ConnectionProperty::ContainerName.name()
        ));
    }

    #[test]
    fn values_are_not_trimmed() {
        let config = ConnectionConfig::new("UseDevelopmentStorage=true", " invoices ").unwrap();
        assert_eq!(config.container_name(), " invoices ");

        let config = ConnectionConfig::new("UseDevelopmentStorage=true", "   ").unwrap();
        assert_eq!(config.container_name(), "   ");
    }

    #[test]
    fn from_properties_reads_descriptor_names() {
        let config = ConnectionConfig::from_properties(&properties(&[
            (ConnectionProperty::ConnectionString, "UseDevelopmentStorage=true"),
            (ConnectionProperty::ContainerName, "invoices"),
        ]))
        .unwrap();

        assert_eq!(config.connection_string(), "UseDevelopmentStorage=true");
        assert_eq!(config.container_name(), "invoices");
    }

    #[test]
    fn from_properties_requires_both() {
        let err = ConnectionConfig::from_properties(&properties(&[(
            ConnectionProperty::ContainerName,
            "invoices",
        )]))
        .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("connection string"));
    }

    #[test]
    fn debug_hides_connection_string() {
        let config = ConnectionConfig::new("AccountName=a;AccountKey=c2VjcmV0", "invoices").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("invoices"));
        assert!(ConnectionProperty::ConnectionString.is_sensitive());
        assert!(!ConnectionProperty::ContainerName.is_sensitive());
    }

    #[test]
    fn serialized_form_omits_connection_string() {
        let config = ConnectionConfig::new("AccountName=a;AccountKey=c2VjcmV0", "invoices").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"containerName":"invoices"}"#);
        assert!(!json.contains("c2VjcmV0"));
    }

    #[test]
    fn deserialization_validates_values() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"connectionString":"UseDevelopmentStorage=true","containerName":"invoices"}"#,
        )
        .unwrap();
        assert_eq!(config.connection_string(), "UseDevelopmentStorage=true");

        let err = serde_json::from_str::<ConnectionConfig>(
            r#"{"connectionString":"","containerName":"invoices"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
