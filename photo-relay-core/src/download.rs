//! Fetch phase: list an album, pick the largest rendition of every photo and
//! stage the images plus a manifest on local disk.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::contract::{AlbumQuery, PhotoSource};
use crate::error::{RelayError, RelayResult};
use crate::photos::{parse_listing, ManifestEntry, PhotoRecord, StagedPhoto};
use crate::staging;

/// HTTP client for the VK `photos.get` method.
pub struct VkPhotoClient {
    client: Client,
    api_url: String,
    api_version: String,
    access_token: String,
}

impl VkPhotoClient {
    pub fn new(api_url: &str, api_version: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[async_trait]
impl PhotoSource for VkPhotoClient {
    async fn list_photos(&self, query: &AlbumQuery) -> RelayResult<Vec<PhotoRecord>> {
        let url = format!("{}/photos.get", self.api_url);
        info!(
            owner_id = query.owner_id,
            album_id = %query.album_id,
            count = query.count,
            "Requesting album listing"
        );

        let params: Vec<(&str, String)> = vec![
            ("access_token", self.access_token.clone()),
            ("v", self.api_version.clone()),
            ("owner_id", query.owner_id.to_string()),
            ("album_id", query.album_id.clone()),
            ("extended", "1".to_string()),
            ("photo_sizes", "1".to_string()),
            ("count", query.count.to_string()),
        ];
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match parse_listing(&body) {
            Err(e @ RelayError::SourceApi { .. }) => {
                error!(%status, error = %e, "Album listing returned an error");
                Err(e)
            }
            _ if !status.is_success() => {
                error!(%status, "Album listing failed");
                Err(RelayError::SourceApi {
                    code: status.as_u16().to_string(),
                    message: body,
                })
            }
            Ok(photos) => {
                info!(photos = photos.len(), "Album listing received");
                Ok(photos)
            }
            Err(e) => Err(e),
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> RelayResult<u64> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

/// What the fetch phase left in the staging directory.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub staging_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

/// Populate `staging_dir` with one image per listed photo and the manifest.
///
/// The listing is requested and validated before the directory is touched,
/// so an error response leaves any previous staging content in place. Once
/// writing starts the directory is reset first and any failure aborts the
/// whole batch. A partially written image is removed so the kept staging
/// directory never holds a truncated file.
pub async fn fetch_photos<S>(
    source: &S,
    query: &AlbumQuery,
    staging_dir: &Path,
) -> RelayResult<FetchReport>
where
    S: PhotoSource + ?Sized,
{
    let photos = source.list_photos(query).await?;
    let staged = photos
        .iter()
        .map(StagedPhoto::from_record)
        .collect::<RelayResult<Vec<_>>>()?;

    staging::reset(staging_dir)?;

    let entries: Vec<ManifestEntry> = staged.iter().map(StagedPhoto::manifest_entry).collect();
    let manifest_path = staging::write_manifest(staging_dir, &entries)?;

    for photo in &staged {
        let dest = staging_dir.join(&photo.file_name);
        let bytes = match source.download(&photo.url, &dest).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(file = %photo.file_name, error = %e, "Photo download failed");
                staging::discard(&dest);
                return Err(e);
            }
        };
        info!(file = %photo.file_name, size = %photo.size, bytes, "Downloaded photo");
    }

    info!(
        photos = entries.len(),
        staging_dir = %staging_dir.display(),
        "Fetch phase complete"
    );
    Ok(FetchReport {
        staging_dir: staging_dir.to_path_buf(),
        manifest_path,
        entries,
    })
}
