/// `load_config` module: reads the static YAML run description into the core [`RelayConfig`].
///
/// The file carries no secrets. Access tokens are read from the environment
/// when the clients are built (see [`crate::cli`] and [`crate::upload`]).
///
/// # Accepted schema
/// ```yaml
/// staging_dir: ./TMP
/// keep_staging: false
/// source:
///   api_version: "5.131"
///   owner_id: 1
///   album_id: profile
///   count: 5
/// destination:
///   folder: vk-backup
/// ```
/// Every key except `source.owner_id` has a default.
///
/// # Errors
/// Read, parse and validation failures are returned as `anyhow::Error` with the
/// offending path or field in the message.
use anyhow::Result;
use photo_relay_core::config::RelayConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RelayConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: RelayConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Err(e) = config.validate() {
        error!(error = %e, config_path = ?path_ref, "Config failed validation");
        return Err(anyhow::anyhow!("Invalid config: {e}"));
    }

    config.trace_loaded();
    Ok(config)
}
