#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use nimbus_blob::ServiceLifecycle;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "nimbus_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "nimbus_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "nimbus_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "nimbus_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate()?;

    let mut lifecycle = ServiceLifecycle::new();
    lifecycle
        .initialize(cli.service_identifier())
        .context("failed to initialize connection service")?;
    let service = lifecycle
        .enable_with(cli.connection.clone())
        .context("failed to enable connection service")?;

    let result = command::execute(&cli.command, service.as_ref()).await;

    drop(service);
    lifecycle
        .disable()
        .context("failed to disable connection service")?;

    result
}
