//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── identifier                  # Service identifier (random when unset)
//! ├── connection: ConnectionConfig # Connection string, container name
//! ├── telemetry: TelemetryConfig   # Log format and level
//! └── command: Command             # check | describe | list
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! nimbus-cli --connection-string "UseDevelopmentStorage=true" --container-name invoices check
//!
//! # Or via environment variables
//! AZURE_STORAGE_CONNECTION_STRING="UseDevelopmentStorage=true" \
//! AZURE_STORAGE_CONTAINER_NAME=invoices nimbus-cli list --prefix 2024/
//! ```

mod telemetry;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nimbus_blob::ConnectionConfig;
pub use telemetry::{LogFormat, TelemetryConfig};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "nimbus")]
#[command(about = "Resolve and inspect an Azure Blob Storage container")]
#[command(version)]
pub struct Cli {
    /// Identifier assigned to the connection service.
    #[arg(long, env = "NIMBUS_SERVICE_ID")]
    pub identifier: Option<String>,

    /// Storage account connection and container.
    #[clap(flatten)]
    pub connection: ConnectionConfig,

    /// Log output configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands run against the configured container.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Resolve the account and container and report success.
    Check,
    /// Print the resolved account and container as JSON, without secrets.
    Describe,
    /// List blobs in the container.
    List {
        /// Only list blobs whose key starts with this prefix.
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Returns the configured identifier or a fresh random one.
    pub fn service_identifier(&self) -> String {
        self.identifier
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.connection
            .validate()
            .context("invalid connection configuration")?;
        self.telemetry
            .validate()
            .context("invalid telemetry configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            identifier = ?self.identifier,
            container = %self.connection.container_name(),
            command = ?self.command,
            log_format = ?self.telemetry.log_format,
            "Configuration loaded"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
