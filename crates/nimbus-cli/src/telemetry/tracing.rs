//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, TelemetryConfig};

type StderrWriter = fn() -> std::io::Stderr;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level:
///
/// ```bash
/// RUST_LOG=debug nimbus-cli check
/// RUST_LOG=nimbus_blob=trace nimbus-cli list
/// ```
///
/// Events go to stderr so command output on stdout stays clean.
pub(super) fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = create_env_filter(&config.log_level)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format {
        LogFormat::Text => registry.with(create_fmt_layer()).try_init(),
        LogFormat::Json => registry
            .with(create_fmt_layer().json().flatten_event(true))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}

/// Creates an environment filter, falling back to `default_directive`.
fn create_env_filter(default_directive: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}

/// Creates a formatted tracing layer writing to stderr.
fn create_fmt_layer<S>() -> fmt::Layer<S, DefaultFields, Format, StderrWriter> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr as StderrWriter)
}

