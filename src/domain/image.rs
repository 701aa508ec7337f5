//! Image record domain model.
//!
//! The backend describes images in several shapes (paginated listing entries,
//! collection members, similarity-search hits, bare filenames). Every one of them
//! is normalized into a single [`ImageRecord`] before any other component sees it.

use serde::{Deserialize, Serialize};

/// One item in the gallery.
///
/// `identity` is the stable path or filename string the backend uses as the key
/// for search, collection membership, and ordering. There is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub identity: String,
    pub display_url: String,
    pub annotation: Option<String>,
}

/// Borrowed view of the fields an image record can be derived from.
///
/// Backend shapes are heterogeneous, so every field is optional. At least one of
/// `path` and `filename` must be present for a record to be produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSource<'a> {
    pub path: Option<&'a str>,
    pub filename: Option<&'a str>,
    pub url: Option<&'a str>,
    pub annotation: Option<&'a str>,
}

impl ImageRecord {
    /// Normalizes a backend image description into a record.
    ///
    /// Returns `None` when neither `path` nor `filename` is present (or both are
    /// blank), since such an entry cannot participate in ordering or membership.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapestry_client::domain::{ImageRecord, ImageSource};
    ///
    /// let record = ImageRecord::normalize(
    ///     ImageSource { path: Some("cats/tabby.jpg"), ..Default::default() },
    ///     "pets",
    /// ).unwrap();
    /// assert_eq!(record.identity, "cats/tabby.jpg");
    /// assert_eq!(record.display_url, "/images/tabby.jpg?dataset_id=pets");
    /// ```
    #[must_use]
    pub fn normalize(source: ImageSource<'_>, dataset_id: &str) -> Option<Self> {
        let identity = source
            .path
            .filter(|p| !p.trim().is_empty())
            .or_else(|| source.filename.filter(|f| !f.trim().is_empty()))?
            .to_string();

        let display_url = resolve_display_url(&identity, source.url, dataset_id);
        let annotation = source
            .annotation
            .filter(|a| !a.trim().is_empty())
            .map(String::from);

        Some(Self {
            identity,
            display_url,
            annotation,
        })
    }
}

/// Resolves the dataset-qualified URL an image's bytes are served from.
///
/// Resolution order:
/// 1. A `datasets/<id>/` segment inside the identity pins the image to that
///    dataset, regardless of the currently selected one.
/// 2. A backend URL that already names a dataset is used verbatim.
/// 3. Any other backend URL gets the current dataset appended.
/// 4. Otherwise the URL is built from the last path segment, under `/uploads`
///    for uploaded files and `/images` for everything else.
#[must_use]
pub fn resolve_display_url(identity: &str, url: Option<&str>, dataset_id: &str) -> String {
    let segments: Vec<&str> = identity.split('/').collect();
    let filename = segments.last().copied().unwrap_or(identity);
    let is_upload = identity.contains("uploads");

    if let Some(idx) = segments.iter().position(|s| *s == "datasets") {
        if let Some(owner) = segments.get(idx + 1).filter(|s| !s.is_empty()) {
            let folder = if is_upload { "uploads" } else { "images" };
            return format!("/{folder}/{filename}?dataset_id={owner}");
        }
    }

    match url.filter(|u| !u.is_empty()) {
        Some(u) if u.contains("dataset_id=") => u.to_string(),
        Some(u) => {
            let separator = if u.contains('?') { '&' } else { '?' };
            format!("{u}{separator}dataset_id={dataset_id}")
        }
        None => {
            let folder = if is_upload { "uploads" } else { "images" };
            format!("/{folder}/{filename}?dataset_id={dataset_id}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_prefers_path_over_filename() {
        let record = ImageRecord::normalize(
            ImageSource {
                path: Some("/data/images/a.jpg"),
                filename: Some("a.jpg"),
                ..Default::default()
            },
            "ds",
        )
        .unwrap();
        assert_eq!(record.identity, "/data/images/a.jpg");
    }

    #[test]
    fn identity_falls_back_to_filename() {
        let record = ImageRecord::normalize(
            ImageSource {
                filename: Some("b.png"),
                annotation: Some("a red bicycle"),
                ..Default::default()
            },
            "ds",
        )
        .unwrap();
        assert_eq!(record.identity, "b.png");
        assert_eq!(record.annotation.as_deref(), Some("a red bicycle"));
    }

    #[test]
    fn entries_without_identity_are_dropped() {
        assert!(ImageRecord::normalize(ImageSource::default(), "ds").is_none());
        assert!(ImageRecord::normalize(
            ImageSource {
                path: Some("  "),
                url: Some("/images/x.jpg"),
                ..Default::default()
            },
            "ds"
        )
        .is_none());
    }

    #[test]
    fn dataset_segment_in_path_wins_over_current_dataset() {
        let url = resolve_display_url("/srv/datasets/abc/images/cat.jpg", None, "other");
        assert_eq!(url, "/images/cat.jpg?dataset_id=abc");

        let url = resolve_display_url("/srv/datasets/abc/uploads/up.jpg", None, "other");
        assert_eq!(url, "/uploads/up.jpg?dataset_id=abc");
    }

    #[test]
    fn backend_url_is_qualified_with_current_dataset() {
        assert_eq!(
            resolve_display_url("x.jpg", Some("/images/x.jpg"), "ds"),
            "/images/x.jpg?dataset_id=ds"
        );
        assert_eq!(
            resolve_display_url("x.jpg", Some("/images/x.jpg?size=small"), "ds"),
            "/images/x.jpg?size=small&dataset_id=ds"
        );
        assert_eq!(
            resolve_display_url("x.jpg", Some("/images/x.jpg?dataset_id=zz"), "ds"),
            "/images/x.jpg?dataset_id=zz"
        );
    }

    #[test]
    fn uploads_are_served_from_upload_folder() {
        assert_eq!(
            resolve_display_url("/tmp/uploads/q.jpg", None, "ds"),
            "/uploads/q.jpg?dataset_id=ds"
        );
    }
}
