//! Command execution against a running connection service.

use anyhow::Context;
use nimbus_blob::BlobConnectionService;
use serde::Serialize;

use crate::TRACING_TARGET_COMMAND;
use crate::config::Command;

/// Non-secret view of a configured connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub identifier: String,
    pub account_name: String,
    pub blob_endpoint: String,
    pub emulator: bool,
    pub credential_kind: &'static str,
    pub container_name: String,
    pub container_uri: String,
}

impl Description {
    /// Builds the description without contacting the service.
    pub fn new(service: &dyn BlobConnectionService) -> nimbus_blob::Result<Self> {
        let account = service.storage_account()?;
        Ok(Self {
            identifier: service.identifier().to_owned(),
            account_name: account.account_name().to_owned(),
            blob_endpoint: account.blob_endpoint().to_string(),
            emulator: account.is_emulator(),
            credential_kind: account.credentials().kind(),
            container_name: service.container_name().to_owned(),
            container_uri: account.container_uri(service.container_name()).to_string(),
        })
    }
}

/// Runs `command`, writing its output to stdout.
pub async fn execute(command: &Command, service: &dyn BlobConnectionService) -> anyhow::Result<()> {
    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        identifier = %service.identifier(),
        command = ?command,
        "Executing command"
    );

    match command {
        Command::Check => {
            let container = service
                .container_reference()
                .await
                .context("container check failed")?;
            println!("ok: container \"{}\" at {}", container.name(), container.uri());
        }
        Command::Describe => {
            let description = Description::new(service).context("failed to resolve account")?;
            let json = serde_json::to_string_pretty(&description)?;
            println!("{json}");
        }
        Command::List { prefix } => {
            let container = service
                .container_reference()
                .await
                .context("failed to resolve container")?;
            let blobs = container
                .list(prefix)
                .await
                .context("failed to list blobs")?;

            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                container = %container.name(),
                prefix = %prefix,
                count = blobs.len(),
                "Listed blobs"
            );

            for blob in blobs {
                println!("{}\t{}", blob.size, blob.location);
            }
        }
    }

    Ok(())
}
