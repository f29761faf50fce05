//! Error type shared by every stage of the relay pipeline.
//!
//! Everything represented here is fatal: it is propagated with `?` up to the
//! caller of [`crate::synchronise::synchronise`], which reports it and stops.
//! Per-file upload failures are not errors; they are collected in
//! [`crate::uploader::UploadReport`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// The photo source answered with an error envelope or a failing status.
    #[error("source API error {code}: {message}")]
    SourceApi { code: String, message: String },

    /// The storage service rejected a control request (folder, upload link).
    #[error("destination API error {code}: {message}")]
    DestinationApi { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("photo {photo_id} has no size variants")]
    NoVariants { photo_id: i64 },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
}

impl RelayError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
