use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};
use tracing::{debug, info};

use crate::error::{RelayError, RelayResult};

pub const DEFAULT_SOURCE_API_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_SOURCE_API_VERSION: &str = "5.131";
pub const DEFAULT_ALBUM_ID: &str = "profile";
pub const DEFAULT_PHOTO_COUNT: u32 = 5;
pub const DEFAULT_DESTINATION_API_URL: &str = "https://cloud-api.yandex.net/v1/disk/resources";
pub const DEFAULT_STAGING_DIR: &str = "TMP";

/// Everything one relay run needs apart from credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Keep the staging directory even after a fully successful run.
    #[serde(default)]
    pub keep_staging: bool,
    pub source: SourceConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_api_url")]
    pub api_url: String,
    #[serde(default = "default_source_api_version")]
    pub api_version: String,
    pub owner_id: i64,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default = "default_photo_count")]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default = "default_destination_api_url")]
    pub api_url: String,
    /// Remote folder name; a timestamp is used when unset.
    #[serde(default)]
    pub folder: Option<String>,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            api_url: default_destination_api_url(),
            folder: None,
        }
    }
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

fn default_source_api_url() -> String {
    DEFAULT_SOURCE_API_URL.to_string()
}

fn default_source_api_version() -> String {
    DEFAULT_SOURCE_API_VERSION.to_string()
}

fn default_photo_count() -> u32 {
    DEFAULT_PHOTO_COUNT
}

fn default_destination_api_url() -> String {
    DEFAULT_DESTINATION_API_URL.to_string()
}

impl RelayConfig {
    pub fn validate(&self) -> RelayResult<()> {
        if self.staging_dir.as_os_str().is_empty() {
            return Err(RelayError::validation("staging_dir", "must not be empty"));
        }
        // The directory is wiped on every run, so it needs a name of its own.
        if !self
            .staging_dir
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
        {
            return Err(RelayError::validation(
                "staging_dir",
                "must name a dedicated directory, not `.`, `..` or a filesystem root",
            ));
        }
        if self.source.owner_id <= 0 {
            return Err(RelayError::validation(
                "source.owner_id",
                "must be a positive integer",
            ));
        }
        if self.source.count == 0 {
            return Err(RelayError::validation(
                "source.count",
                "must be a positive integer",
            ));
        }
        if let Some(folder) = &self.destination.folder {
            if folder.trim().is_empty() {
                return Err(RelayError::validation(
                    "destination.folder",
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            staging_dir = %self.staging_dir.display(),
            owner_id = self.source.owner_id,
            album_id = self.source.album_id.as_deref().unwrap_or(DEFAULT_ALBUM_ID),
            count = self.source.count,
            folder = self.destination.folder.as_deref().unwrap_or("<timestamp>"),
            "Loaded RelayConfig"
        );
        debug!(?self, "RelayConfig loaded (full debug)");
    }
}

impl DestinationConfig {
    /// The configured folder, or `%d-%m-%y_%H-%M-%S` of the current local time.
    pub fn resolve_folder(&self) -> String {
        match &self.folder {
            Some(folder) => folder.trim().to_string(),
            None => chrono::Local::now().format("%d-%m-%y_%H-%M-%S").to_string(),
        }
    }
}
