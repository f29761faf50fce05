///
/// This module implements the CLI interface for photo-relay: command parsing,
/// client construction from the environment and the user-visible summary.
///
/// All pipeline logic (listing, staging, uploading) lives in [`photo-relay-core`].
/// This module is CLI glue only.
///
/// ## How To Use
/// - From the shell: `photo-relay sync --config relay.yaml [--folder NAME] [--keep-staging]`.
/// - From tests: call [`run`] with a constructed [`Cli`].
///
/// Credentials come from `VK_ACCESS_TOKEN` and `YANDEX_DISK_TOKEN`.
///
/// [`photo-relay-core`]: ../../photo-relay-core/
use crate::load_config::load_config;
use crate::upload::YandexDiskClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use photo_relay_core::config::SourceConfig;
use photo_relay_core::download::VkPhotoClient;
use photo_relay_core::synchronise::{synchronise, SynchroniseReport};
use std::path::PathBuf;

pub const SOURCE_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

/// CLI for photo-relay: copy a VK photo album to Yandex Disk.
#[derive(Debug, Parser)]
#[clap(
    name = "photo-relay",
    version,
    about = "Download the largest renditions of a VK album and upload them to Yandex Disk"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch the album into the staging directory and upload it
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Destination folder name, overrides the config file
        #[clap(long)]
        folder: Option<String>,
        /// Keep the staging directory after a successful run
        #[clap(long)]
        keep_staging: bool,
    },
}

fn source_client_from_env(source: &SourceConfig) -> Result<VkPhotoClient> {
    let token = std::env::var(SOURCE_TOKEN_ENV)
        .with_context(|| format!("{SOURCE_TOKEN_ENV} environment variable not set"))?;
    tracing::info!(
        api_url = %source.api_url,
        api_version = %source.api_version,
        "Initialized VkPhotoClient from environment"
    );
    Ok(VkPhotoClient::new(
        &source.api_url,
        &source.api_version,
        &token,
    ))
}

fn print_report(report: &SynchroniseReport) {
    println!("Relay complete: folder '{}'", report.folder);
    println!("  fetched:  {}", report.manifest.len());
    println!("  uploaded: {}", report.uploaded.len());
    for failed in &report.failed {
        println!("  failed:   {} ({})", failed.file_name, failed.reason);
    }
    if !report.staging_cleared {
        println!("  staging kept at {}", report.staging_dir.display());
    }
}

/// Async CLI entrypoint shared by main() and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync {
            config,
            folder,
            keep_staging,
        } => {
            let mut config = load_config(config)?;
            if let Some(folder) = folder {
                config.destination.folder = Some(folder);
            }
            config.keep_staging |= keep_staging;

            tracing::info!(command = "sync", "Starting relay");
            let source = source_client_from_env(&config.source)?;
            let storage = YandexDiskClient::new_from_env(&config.destination)
                .map_err(|e| anyhow::anyhow!("Failed to construct storage client: {e}"))?;

            match synchronise(&config, &source, &storage).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Relay complete");
                    print_report(&report);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Relay failed");
                    Err(anyhow::Error::new(e).context("Relay failed"))
                }
            }
        }
    }
}
