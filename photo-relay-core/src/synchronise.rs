//! High-level pipeline: fetch → stage → create folder → upload → clear.
//!
//! [`synchronise`] runs the two phases strictly in sequence, one network call
//! at a time. Any [`RelayError`] stops the run immediately and leaves the
//! staging directory as it was for inspection. Per-file upload failures do
//! not stop the run; they are part of the returned [`SynchroniseReport`].
//!
//! # Staging cleanup
//! The staging directory is removed only when every staged file was uploaded
//! and `keep_staging` is off. Otherwise it is kept and a warning is logged.

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::RelayConfig;
use crate::contract::{AlbumQuery, CloudStorage, PhotoSource};
use crate::download::fetch_photos;
use crate::error::{RelayError, RelayResult};
use crate::photos::ManifestEntry;
use crate::staging;
use crate::uploader::{upload_staged, FailedUpload};

#[derive(Debug)]
pub struct SynchroniseReport {
    pub folder: String,
    pub staging_dir: PathBuf,
    pub manifest: Vec<ManifestEntry>,
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
    pub staging_cleared: bool,
}

pub async fn synchronise<S, C>(
    config: &RelayConfig,
    source: &S,
    storage: &C,
) -> RelayResult<SynchroniseReport>
where
    S: PhotoSource + ?Sized,
    C: CloudStorage + ?Sized,
{
    info!("[SYNC] Starting relay pipeline");
    config.validate()?;
    let query = AlbumQuery::try_from(&config.source)?;
    let staging_dir = config.staging_dir.as_path();

    let fetched = fetch_photos(source, &query, staging_dir)
        .await
        .map_err(|e| log_fatal("fetch", e))?;
    info!(photos = fetched.entries.len(), "[SYNC] Fetch succeeded");

    let folder = config.destination.resolve_folder();
    let uploads = upload_staged(storage, &folder, staging_dir)
        .await
        .map_err(|e| log_fatal("upload", e))?;

    let staging_cleared = if config.keep_staging {
        info!(path = %staging_dir.display(), "[SYNC] Keeping staging directory as configured");
        false
    } else if !uploads.is_complete() {
        warn!(
            path = %staging_dir.display(),
            failed = uploads.failed.len(),
            "[SYNC] Some uploads failed, keeping staging directory"
        );
        false
    } else {
        match staging::clear(staging_dir) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    path = %staging_dir.display(),
                    error = %e,
                    "[SYNC] Every file uploaded but the staging directory could not be removed"
                );
                false
            }
        }
    };

    info!(
        folder = %folder,
        uploaded = uploads.uploaded.len(),
        failed = uploads.failed.len(),
        "[SYNC] Relay pipeline finished"
    );

    Ok(SynchroniseReport {
        folder,
        staging_dir: fetched.staging_dir,
        manifest: fetched.entries,
        uploaded: uploads.uploaded,
        failed: uploads.failed,
        staging_cleared,
    })
}

fn log_fatal(phase: &str, e: RelayError) -> RelayError {
    error!(phase, error = %e, "[SYNC][ERROR] Aborting run");
    e
}
