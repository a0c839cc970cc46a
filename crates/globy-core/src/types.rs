//! Domain types shared by the transport and the search controller.

use serde::{Deserialize, Serialize};

/// A single photo returned by the search endpoint.
///
/// - `uuid`: backend identity, absent on older responses
/// - `image_url`: hosted display URL
/// - `caption`/`tags`: generated at upload time, both optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(default)]
    pub uuid: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Body of `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ImageItem>,
}

/// Element of the plain JSON array returned by `GET /gallery`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub image_url: String,
    pub caption: String,
}

/// Outcome of notifying the backend that a hosted upload finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Failure payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
