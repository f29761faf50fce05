//! Seams between the pipeline and the two remote services.
//!
//! [`PhotoSource`] is the album provider the photos are fetched from and
//! [`CloudStorage`] is where the staged files end up. Real clients implement
//! them over HTTP; tests use the `mockall` mocks exported under the
//! `test-export-mocks` feature.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use reqwest::StatusCode;
use std::path::Path;

use crate::config::{SourceConfig, DEFAULT_ALBUM_ID};
use crate::error::{RelayError, RelayResult};
use crate::photos::PhotoRecord;

/// Validated parameters of one album listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumQuery {
    pub owner_id: i64,
    pub album_id: String,
    pub count: u32,
}

impl AlbumQuery {
    pub fn new(owner_id: i64, album_id: Option<&str>, count: u32) -> RelayResult<Self> {
        if owner_id <= 0 {
            return Err(RelayError::validation(
                "owner_id",
                "must be a positive integer",
            ));
        }
        if count == 0 {
            return Err(RelayError::validation("count", "must be a positive integer"));
        }
        let album_id = match album_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => DEFAULT_ALBUM_ID.to_string(),
        };
        Ok(Self {
            owner_id,
            album_id,
            count,
        })
    }
}

impl TryFrom<&SourceConfig> for AlbumQuery {
    type Error = RelayError;

    fn try_from(source: &SourceConfig) -> RelayResult<Self> {
        AlbumQuery::new(source.owner_id, source.album_id.as_deref(), source.count)
    }
}

/// A single-use upload link issued by the storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub href: String,
    /// HTTP method the link expects, `PUT` unless the service says otherwise.
    pub method: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// List the photos of an album, at most `query.count` of them.
    async fn list_photos(&self, query: &AlbumQuery) -> RelayResult<Vec<PhotoRecord>>;

    /// Fetch `url` into the file at `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> RelayResult<u64>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Create `path`; an existing folder is reported, not rejected.
    async fn create_folder(&self, path: &str) -> RelayResult<FolderStatus>;

    /// Ask for a fresh upload link for `path`, overwriting whatever is there.
    async fn upload_target(&self, path: &str) -> RelayResult<UploadTarget>;

    /// Stream the local file to the target and return the transport status.
    async fn put_file(&self, target: &UploadTarget, file: &Path) -> RelayResult<StatusCode>;
}
