#![doc = "Storage integration for the CLI: a Yandex Disk REST client implementing `CloudStorage`."]
//
//! # Yandex Disk client
//!
//! [`YandexDiskClient`] talks to the `v1/disk/resources` API:
//!
//! - `PUT  <api>?path=<folder>` creates the destination folder (`409` means it
//!   is already there, which is fine).
//! - `GET  <api>/upload?path=<folder>/<file>&overwrite=true` issues a one-time
//!   upload link.
//! - the file body is streamed to that link; `201 Created` means success.
//!
//! Construct it with [`YandexDiskClient::new_from_env`], which reads the OAuth
//! token from `YANDEX_DISK_TOKEN`.

use async_trait::async_trait;
use photo_relay_core::config::DestinationConfig;
use photo_relay_core::contract::{CloudStorage, FolderStatus, UploadTarget};
use photo_relay_core::error::{RelayError, RelayResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Body, Client, Method, StatusCode};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const TOKEN_ENV: &str = "YANDEX_DISK_TOKEN";

pub struct YandexDiskClient {
    client: Client,
    transfer: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    href: String,
    #[serde(default)]
    method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DiskErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Turn a failing response into [`RelayError::DestinationApi`].
pub fn destination_error(status: StatusCode, body: &str) -> RelayError {
    let parsed: DiskErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = match parsed.error {
        Some(kind) => format!("{} {}", status.as_u16(), kind),
        None => status.as_u16().to_string(),
    };
    let message = parsed
        .message
        .or(parsed.description)
        .unwrap_or_else(|| body.to_string());
    RelayError::DestinationApi { code, message }
}

impl YandexDiskClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("OAuth {}", token))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            transfer: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn new_from_env(
        config: &DestinationConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        match env::var(TOKEN_ENV) {
            Ok(token) => {
                tracing::info!(
                    token_set = !token.is_empty(),
                    api_url = %config.api_url,
                    "Initialized YandexDiskClient from environment"
                );
                Self::new(&config.api_url, &token)
            }
            Err(e) => {
                tracing::error!(error = ?e, "{} missing in environment", TOKEN_ENV);
                Err(Box::new(e))
            }
        }
    }
}

#[async_trait]
impl CloudStorage for YandexDiskClient {
    async fn create_folder(&self, path: &str) -> RelayResult<FolderStatus> {
        tracing::info!(path, "Creating folder on disk");
        let response = self
            .client
            .put(&self.api_url)
            .query(&[("path", path)])
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED => Ok(FolderStatus::Created),
            StatusCode::CONFLICT => Ok(FolderStatus::AlreadyExists),
            status => {
                let body = response.text().await.unwrap_or_default();
                let e = destination_error(status, &body);
                tracing::error!(error = %e, path, "Folder creation rejected");
                Err(e)
            }
        }
    }

    async fn upload_target(&self, path: &str) -> RelayResult<UploadTarget> {
        let url = format!("{}/upload", self.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[("path", path), ("overwrite", "true")])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let e = destination_error(status, &body);
            tracing::error!(error = %e, path, "Upload link request rejected");
            return Err(e);
        }
        let link: LinkResponse = serde_json::from_str(&body)?;
        tracing::debug!(path, href = %link.href, "Received upload link");
        Ok(UploadTarget {
            href: link.href,
            method: link.method.unwrap_or_else(|| "PUT".to_string()),
        })
    }

    async fn put_file(&self, target: &UploadTarget, file: &Path) -> RelayResult<StatusCode> {
        let method = Method::from_bytes(target.method.to_uppercase().as_bytes())
            .unwrap_or(Method::PUT);
        let handle = tokio::fs::File::open(file).await?;
        // The link is pre-signed; the account token must not travel with it.
        let response = self
            .transfer
            .request(method, &target.href)
            .body(Body::from(handle))
            .send()
            .await?;
        Ok(response.status())
    }
}
