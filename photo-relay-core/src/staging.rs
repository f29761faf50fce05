//! Local staging directory shared by the fetch and upload phases.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::RelayResult;
use crate::photos::ManifestEntry;

pub const MANIFEST_FILE_NAME: &str = "info.json";

/// Make sure `dir` exists and is empty. Calling it twice is harmless.
pub fn reset(dir: &Path) -> RelayResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
        debug!(path = %dir.display(), "Removed existing staging directory");
    }
    fs::create_dir_all(dir)?;
    info!(path = %dir.display(), "Staging directory ready");
    Ok(())
}

/// Remove the staging directory and everything in it. Missing is fine.
pub fn clear(dir: &Path) -> RelayResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "Cleared staging directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Staging directory already absent");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Best-effort removal of a single staged file, e.g. after a failed download.
pub fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Discarded partial file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not discard partial file"),
    }
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> RelayResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE_NAME)
}

pub fn write_manifest(dir: &Path, entries: &[ManifestEntry]) -> RelayResult<PathBuf> {
    let path = manifest_path(dir);
    let json = serde_json::to_string(entries)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), entries = entries.len(), "Wrote manifest");
    Ok(path)
}

pub fn read_manifest(dir: &Path) -> RelayResult<Vec<ManifestEntry>> {
    let raw = fs::read_to_string(manifest_path(dir))?;
    Ok(serde_json::from_str(&raw)?)
}
