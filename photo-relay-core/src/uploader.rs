//! Upload phase: create the destination folder and push every staged file
//! into it, one at a time.

use reqwest::StatusCode;
use std::path::Path;
use tracing::{error, info, warn};

use crate::contract::{CloudStorage, FolderStatus};
use crate::error::RelayResult;
use crate::staging;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub folder: String,
    pub folder_existed: bool,
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload every file of `staging_dir` into `folder`.
///
/// Folder creation and upload-link requests are fatal when they fail. The
/// transfer itself is not: anything but `201 Created` is recorded in
/// [`UploadReport::failed`] and the next file is attempted.
pub async fn upload_staged<C>(
    storage: &C,
    folder: &str,
    staging_dir: &Path,
) -> RelayResult<UploadReport>
where
    C: CloudStorage + ?Sized,
{
    let folder_status = storage.create_folder(folder).await.map_err(|e| {
        error!(folder, error = %e, "Failed to create destination folder");
        e
    })?;
    match folder_status {
        FolderStatus::Created => info!(folder, "Created destination folder"),
        FolderStatus::AlreadyExists => info!(folder, "Destination folder already exists, reusing it"),
    }

    let mut report = UploadReport {
        folder: folder.to_string(),
        folder_existed: folder_status == FolderStatus::AlreadyExists,
        ..UploadReport::default()
    };

    for path in staging::list_files(staging_dir)? {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!(path = %path.display(), "Skipping staged file with a non UTF-8 name");
                continue;
            }
        };
        let remote_path = format!("{}/{}", folder, file_name);
        info!(file = %file_name, remote_path = %remote_path, "Uploading file");

        let target = storage.upload_target(&remote_path).await.map_err(|e| {
            error!(file = %file_name, error = %e, "Failed to obtain upload link");
            e
        })?;

        match storage.put_file(&target, &path).await {
            Ok(StatusCode::CREATED) => {
                info!(file = %file_name, "File uploaded");
                report.uploaded.push(file_name);
            }
            Ok(status) => {
                warn!(file = %file_name, %status, "File not uploaded");
                report.failed.push(FailedUpload {
                    file_name,
                    reason: format!("unexpected status {}", status),
                });
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "File not uploaded");
                report.failed.push(FailedUpload {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        folder,
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Upload phase complete"
    );
    Ok(report)
}
