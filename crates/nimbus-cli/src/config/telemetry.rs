//! Log output configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Output format of the fmt layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, colored when attached to a terminal.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging options.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log output format.
    #[arg(long, env = "NIMBUS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default filter directive when `RUST_LOG` is unset.
    #[arg(long, env = "NIMBUS_LOG_LEVEL", default_value = "info")]
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    /// Validates the logging options.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("log level must not be empty");
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}
