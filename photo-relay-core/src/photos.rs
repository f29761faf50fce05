//! Photo listing model: what the source API returns, how the best rendition of
//! each photo is chosen and how staged files are named.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{RelayError, RelayResult};

/// One photo as listed by the source album endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: i64,
    #[serde(default)]
    pub likes: Likes,
    #[serde(default)]
    pub sizes: Vec<SizeVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Likes {
    #[serde(default)]
    pub count: u64,
}

/// One rendition of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeVariant {
    #[serde(rename = "type")]
    pub label: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub url: String,
}

impl SizeVariant {
    pub fn dimension_sum(&self) -> u64 {
        u64::from(self.width) + u64::from(self.height)
    }
}

/// Returns the variant with the largest `width + height`.
///
/// When several variants share the maximum the first one in listing order
/// wins (`Iterator::max_by_key` would return the last).
pub fn select_largest_variant(variants: &[SizeVariant]) -> Option<&SizeVariant> {
    variants.iter().fold(None::<&SizeVariant>, |best, candidate| match best {
        Some(current) if current.dimension_sum() >= candidate.dimension_sum() => Some(current),
        _ => Some(candidate),
    })
}

/// `id<photo_id>_likes<like_count>.jpg`; unique as long as photo ids are.
pub fn staged_file_name(photo_id: i64, like_count: u64) -> String {
    format!("id{}_likes{}.jpg", photo_id, like_count)
}

/// A photo chosen for staging: target file name plus the rendition to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPhoto {
    pub file_name: String,
    pub size: String,
    pub url: String,
}

impl StagedPhoto {
    pub fn from_record(record: &PhotoRecord) -> RelayResult<Self> {
        let variant = select_largest_variant(&record.sizes)
            .ok_or(RelayError::NoVariants { photo_id: record.id })?;
        let staged = StagedPhoto {
            file_name: staged_file_name(record.id, record.likes.count),
            size: variant.label.clone(),
            url: variant.url.clone(),
        };
        debug!(
            photo_id = record.id,
            file = %staged.file_name,
            size = %staged.size,
            width = variant.width,
            height = variant.height,
            "Selected largest variant"
        );
        Ok(staged)
    }

    pub fn manifest_entry(&self) -> ManifestEntry {
        ManifestEntry {
            file_name: self.file_name.clone(),
            size: self.size.clone(),
        }
    }
}

/// One line of the manifest written next to the staged images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "file name")]
    pub file_name: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    response: Option<ListingBody>,
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    error_message: Option<ErrorMessageBody>,
}

#[derive(Debug, Deserialize)]
struct ListingBody {
    #[serde(default)]
    items: Vec<PhotoRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<Value>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessageBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default, alias = "type")]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn code_to_string(code: Option<&Value>) -> String {
    match code {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Parses a `photos.get` response body.
///
/// Both error envelopes the source uses are turned into
/// [`RelayError::SourceApi`] carrying the reported code and message.
pub fn parse_listing(body: &str) -> RelayResult<Vec<PhotoRecord>> {
    let envelope: ListingEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.error {
        return Err(RelayError::SourceApi {
            code: code_to_string(err.error_code.as_ref()),
            message: err.error_msg.unwrap_or_default(),
        });
    }

    if let Some(err) = envelope.error_message {
        let code = code_to_string(err.code.as_ref());
        let code = match err.error_type {
            Some(kind) => format!("{} - {}", code, kind),
            None => code,
        };
        return Err(RelayError::SourceApi {
            code,
            message: err.message.unwrap_or_default(),
        });
    }

    match envelope.response {
        Some(listing) => Ok(listing.items),
        None => Err(RelayError::SourceApi {
            code: "malformed".to_string(),
            message: "response object is missing".to_string(),
        }),
    }
}
