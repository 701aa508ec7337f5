//! Wire types for the gallery backend's JSON API.
//!
//! These types mirror the backend's request and response bodies and are kept
//! separate from the domain types. Image entries in particular arrive in several
//! shapes; [`WireImage::source`] exposes them uniformly so the controller can
//! normalize them into [`ImageRecord`](crate::domain::ImageRecord)s.

use crate::domain::{Collection, Dataset, ImageSource, ProcessingStatus, ReorderBatch};
use serde::{Deserialize, Serialize};

/// An image entry as returned by listing and search endpoints.
///
/// Older backends return bare filename strings; current ones return objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireImage {
    Record(WireImageRecord),
    Name(String),
}

/// Object form of an image entry. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireImageRecord {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl WireImage {
    /// Borrowed normalization input for this entry.
    #[must_use]
    pub fn source(&self) -> ImageSource<'_> {
        match self {
            Self::Name(name) => ImageSource {
                filename: Some(name.as_str()),
                ..ImageSource::default()
            },
            Self::Record(record) => ImageSource {
                path: record.path.as_deref(),
                filename: record.filename.as_deref(),
                url: record.url.as_deref(),
                annotation: record.prompt.as_deref().or_else(|| {
                    record
                        .metadata
                        .as_ref()
                        .and_then(|m| m.get("prompt"))
                        .and_then(serde_json::Value::as_str)
                }),
            },
        }
    }
}

/// Response of `GET /images`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImagePage {
    #[serde(default)]
    pub images: Vec<WireImage>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub processing_status: Option<ProcessingStatus>,
}

/// One member of a collection, as returned by `GET /collections/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMember {
    pub path: String,
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl CollectionMember {
    #[must_use]
    pub fn source(&self) -> ImageSource<'_> {
        ImageSource {
            path: Some(self.path.as_str()),
            annotation: self.prompt.as_deref(),
            ..ImageSource::default()
        }
    }
}

/// Response of `GET /collections/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionMembers {
    #[serde(default)]
    pub images: Vec<CollectionMember>,
}

/// Kind of similarity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Text,
    Image,
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub dataset_id: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub query: Option<String>,
    pub image: Option<String>,
    pub limit: u32,
    pub page: u32,
}

/// Response of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<WireImage>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Response of `GET /collections`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// Response of `GET /datasets`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

/// Body of the collection membership endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePathsBody {
    pub image_paths: Vec<String>,
}

/// Body of `POST /collections` and `PATCH /collections/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNameBody {
    pub name: String,
}

/// Body of `PATCH /collections/{id}/positions`.
pub type PositionsBody = ReorderBatch;

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A file handed over by the file input or dropped from outside the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Only image content is accepted for upload.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_accepts_bare_names_and_objects() {
        let json = r#"{
            "images": [
                "plain.jpg",
                {"path": "/d/images/a.jpg", "filename": "a.jpg", "metadata": {"prompt": "a dog"}}
            ],
            "total": 2,
            "has_more": false
        }"#;
        let page: ImagePage = serde_json::from_str(json).unwrap();

        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].source().filename, Some("plain.jpg"));
        let second = page.images[1].source();
        assert_eq!(second.path, Some("/d/images/a.jpg"));
        assert_eq!(second.annotation, Some("a dog"));
        assert!(page.processing_status.is_none());
    }

    #[test]
    fn search_request_uses_type_field() {
        let request = SearchRequest {
            dataset_id: "ds".to_string(),
            kind: SearchKind::Text,
            query: Some("red car".to_string()),
            image: None,
            limit: 20,
            page: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["query"], "red car");
        assert!(value["image"].is_null());
    }

    #[test]
    fn positions_body_shape() {
        let body: PositionsBody = ReorderBatch {
            positions: vec![crate::domain::PositionEntry {
                path: "a.jpg".to_string(),
                position: 0,
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["positions"][0]["path"], "a.jpg");
        assert_eq!(value["positions"][0]["position"], 0);
    }
}
