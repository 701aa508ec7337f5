//! Drag intent classifier.
//!
//! Tracks the single drag gesture in flight and resolves it, exactly once and
//! only at drop time, into what the user meant: reorder, add to a collection,
//! search by image, or upload an external file.
//!
//! # State Machine
//!
//! ```text
//! Idle ──begin──▶ Dragging(gesture) ──drop──▶ Resolved(intent) ──▶ Idle
//!                      │
//!                      └──cancel──▶ Idle
//! ```
//!
//! Hover targets reported during the drag only drive highlighting. The target
//! passed with the drop event is the one that decides the intent, because the
//! user may cross several candidate targets before releasing.
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::drag::{DragClassifier, DropOutcome, DropPayload, DropTarget, DropData};
//! use tapestry_client::app::Mode;
//!
//! let mut classifier = DragClassifier::default();
//! classifier.begin(Some("a.jpg".to_string()));
//! let payload = DropPayload::Internal(DropData::internal("a.jpg").to_json());
//! let target = DropTarget::CollectionsSidebar { collection_id: "c1".to_string() };
//!
//! let outcome = classifier.drop(Some(&target), payload, Mode::Browsing);
//! assert_eq!(
//!     outcome,
//!     DropOutcome::AddToCollection { collection_id: "c1".to_string(), identity: "a.jpg".to_string() }
//! );
//! assert!(!classifier.is_dragging());
//! ```

use crate::app::modes::Mode;
use crate::domain::error::{GalleryError, Result};
use crate::storage::models::UploadFile;
use serde::{Deserialize, Serialize};

/// Where the dragged payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// An image already in the grid.
    InternalImage,
    /// A file dragged in from outside the gallery.
    ExternalFile,
}

/// A surface that can report itself as the active drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// An entry of the collections sidebar.
    CollectionsSidebar { collection_id: String },
    /// A cell of the image grid.
    GridItem { index: usize },
    /// The general drop zone above the grid.
    DropZone,
    /// A target that explicitly means "search with this image".
    SearchZone,
}

/// Resolved purpose of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragIntent {
    #[default]
    Unresolved,
    Reorder,
    AddToCollection,
    SearchByImage,
    Upload,
}

/// The transient state of one drag, from drag start to drop or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    /// Identity of the dragged image; `None` for external files.
    ///
    /// Held by identity so reorder steps keep following the same image when
    /// the list is reloaded underneath the gesture.
    pub source: Option<String>,
    pub payload_kind: PayloadKind,
    /// Last target that reported a hover. Used for highlighting only.
    pub hover: Option<DropTarget>,
    pub intent: DragIntent,
}

/// Payload attached to internal drags: `{"type": "internal", "path": "<identity>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropData {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

impl DropData {
    #[must_use]
    pub fn internal(identity: &str) -> Self {
        Self {
            kind: "internal".to_string(),
            path: identity.to_string(),
        }
    }

    /// Serializes the payload for the drag data transfer.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::json!({ "type": self.kind, "path": self.path }).to_string()
    }

    /// Parses a drag data transfer string.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::DragPayload`] for anything that is not an internal
    /// payload with a non-empty path.
    pub fn parse(raw: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(raw)
            .map_err(|e| GalleryError::DragPayload(e.to_string()))?;
        if data.kind != "internal" {
            return Err(GalleryError::DragPayload(format!(
                "unexpected payload type {:?}",
                data.kind
            )));
        }
        if data.path.trim().is_empty() {
            return Err(GalleryError::DragPayload("empty path".to_string()));
        }
        Ok(data)
    }
}

/// Data delivered with a drop event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// Raw JSON from the drag data transfer.
    Internal(String),
    /// A file from outside the gallery.
    External(UploadFile),
}

/// What a drop resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The reorder already happened step by step while hovering; nothing left to do.
    Reorder { index: usize },
    AddToCollection { collection_id: String, identity: String },
    SearchByImage { identity: String },
    Upload { file: UploadFile },
    /// Unparsable payload, no claiming target, or no active gesture.
    Ignored,
}

impl DropOutcome {
    const fn intent(&self) -> DragIntent {
        match self {
            Self::Reorder { .. } => DragIntent::Reorder,
            Self::AddToCollection { .. } => DragIntent::AddToCollection,
            Self::SearchByImage { .. } => DragIntent::SearchByImage,
            Self::Upload { .. } => DragIntent::Upload,
            Self::Ignored => DragIntent::Unresolved,
        }
    }
}

/// Owner of the in-flight gesture.
#[derive(Debug, Clone, Default)]
pub struct DragClassifier {
    gesture: Option<DragGesture>,
}

impl DragClassifier {
    #[must_use]
    pub const fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Starts a gesture. `source` is `None` for external files.
    ///
    /// A gesture already in flight is replaced.
    pub fn begin(&mut self, source: Option<String>) {
        let payload_kind = if source.is_some() {
            PayloadKind::InternalImage
        } else {
            PayloadKind::ExternalFile
        };
        tracing::debug!(source = ?source, payload_kind = ?payload_kind, "drag started");
        self.gesture = Some(DragGesture {
            source,
            payload_kind,
            hover: None,
            intent: DragIntent::Unresolved,
        });
    }

    /// Records the hovered target. Returns whether the highlight changed.
    pub fn hover(&mut self, target: &DropTarget) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        if gesture.hover.as_ref() == Some(target) {
            return false;
        }
        gesture.hover = Some(target.clone());
        true
    }

    /// Abandons the gesture and clears all highlight state.
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            tracing::debug!("drag cancelled");
        }
    }

    /// Resolves the gesture at drop time and returns to idle.
    ///
    /// The rules, applied to the target carried by the drop event:
    ///
    /// 1. An external file becomes an upload (image content only).
    /// 2. An internal image on a sidebar entry is added to that collection.
    /// 3. An internal image on a grid item while viewing a collection is a reorder.
    /// 4. An internal image on the drop zone outside a collection, or on the
    ///    explicit search target, becomes a search by image.
    ///
    /// Anything else, including a malformed payload, resolves to
    /// [`DropOutcome::Ignored`].
    pub fn drop(&mut self, target: Option<&DropTarget>, payload: DropPayload, mode: Mode) -> DropOutcome {
        let Some(mut gesture) = self.gesture.take() else {
            tracing::debug!("drop without an active gesture ignored");
            return DropOutcome::Ignored;
        };
        let Some(target) = target else {
            tracing::debug!("drop not claimed by any target");
            return DropOutcome::Ignored;
        };

        let outcome = match payload {
            DropPayload::External(file) if file.is_image() => DropOutcome::Upload { file },
            DropPayload::External(file) => {
                tracing::debug!(content_type = %file.content_type, "non-image file dropped");
                DropOutcome::Ignored
            }
            DropPayload::Internal(raw) => match DropData::parse(&raw) {
                Ok(data) => Self::classify_internal(&gesture, target, data.path, mode),
                Err(e) => {
                    tracing::debug!(error = %e, "drop payload rejected");
                    DropOutcome::Ignored
                }
            },
        };

        gesture.intent = outcome.intent();
        tracing::debug!(intent = ?gesture.intent, target = ?target, "drag resolved");
        outcome
    }

    fn classify_internal(gesture: &DragGesture, target: &DropTarget, identity: String, mode: Mode) -> DropOutcome {
        match target {
            DropTarget::CollectionsSidebar { collection_id } => DropOutcome::AddToCollection {
                collection_id: collection_id.clone(),
                identity,
            },
            DropTarget::GridItem { index }
                if mode == Mode::CollectionView && gesture.source.is_some() =>
            {
                DropOutcome::Reorder { index: *index }
            }
            DropTarget::SearchZone => DropOutcome::SearchByImage { identity },
            DropTarget::DropZone if mode != Mode::CollectionView => {
                DropOutcome::SearchByImage { identity }
            }
            _ => DropOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(identity: &str) -> DropPayload {
        DropPayload::Internal(DropData::internal(identity).to_json())
    }

    fn dragging(identity: &str) -> Option<String> {
        Some(identity.to_string())
    }

    fn sidebar(id: &str) -> DropTarget {
        DropTarget::CollectionsSidebar {
            collection_id: id.to_string(),
        }
    }

    #[test]
    fn external_image_becomes_upload() {
        let mut classifier = DragClassifier::default();
        classifier.begin(None);
        let file = UploadFile {
            name: "new.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };

        let outcome = classifier.drop(Some(&DropTarget::DropZone), DropPayload::External(file.clone()), Mode::Browsing);
        assert_eq!(outcome, DropOutcome::Upload { file });
    }

    #[test]
    fn external_non_image_is_ignored() {
        let mut classifier = DragClassifier::default();
        classifier.begin(None);
        let file = UploadFile {
            name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![],
        };
        let outcome = classifier.drop(Some(&DropTarget::DropZone), DropPayload::External(file), Mode::Browsing);
        assert_eq!(outcome, DropOutcome::Ignored);
    }

    #[test]
    fn grid_drop_reorders_only_in_collection_view() {
        let mut classifier = DragClassifier::default();
        classifier.begin(dragging("a.jpg"));
        let target = DropTarget::GridItem { index: 3 };
        assert_eq!(
            classifier.drop(Some(&target), internal("a.jpg"), Mode::CollectionView),
            DropOutcome::Reorder { index: 3 }
        );

        classifier.begin(dragging("a.jpg"));
        assert_eq!(
            classifier.drop(Some(&target), internal("a.jpg"), Mode::Browsing),
            DropOutcome::Ignored
        );
    }

    #[test]
    fn drop_zone_searches_outside_collections() {
        let mut classifier = DragClassifier::default();
        classifier.begin(dragging("a.jpg"));
        assert_eq!(
            classifier.drop(Some(&DropTarget::DropZone), internal("a.jpg"), Mode::Browsing),
            DropOutcome::SearchByImage {
                identity: "a.jpg".to_string()
            }
        );

        classifier.begin(dragging("a.jpg"));
        assert_eq!(
            classifier.drop(Some(&DropTarget::DropZone), internal("a.jpg"), Mode::CollectionView),
            DropOutcome::Ignored
        );

        classifier.begin(dragging("a.jpg"));
        assert_eq!(
            classifier.drop(Some(&DropTarget::SearchZone), internal("a.jpg"), Mode::CollectionView),
            DropOutcome::SearchByImage {
                identity: "a.jpg".to_string()
            }
        );
    }

    #[test]
    fn drop_target_wins_over_hover() {
        let mut classifier = DragClassifier::default();
        classifier.begin(dragging("x.jpg"));
        assert!(classifier.hover(&sidebar("c1")));
        assert!(classifier.hover(&DropTarget::GridItem { index: 0 }));

        let outcome = classifier.drop(Some(&sidebar("c2")), internal("x.jpg"), Mode::CollectionView);
        assert_eq!(
            outcome,
            DropOutcome::AddToCollection {
                collection_id: "c2".to_string(),
                identity: "x.jpg".to_string()
            }
        );

        classifier.begin(dragging("x.jpg"));
        assert!(classifier.hover(&sidebar("c1")));
        assert_eq!(
            classifier.drop(Some(&DropTarget::GridItem { index: 0 }), internal("x.jpg"), Mode::CollectionView),
            DropOutcome::Reorder { index: 0 }
        );
    }

    #[test]
    fn malformed_payload_is_a_silent_no_op() {
        let mut classifier = DragClassifier::default();
        classifier.begin(dragging("a.jpg"));
        classifier.hover(&sidebar("c1"));

        let outcome = classifier.drop(Some(&sidebar("c1")), DropPayload::Internal("{oops".to_string()), Mode::Browsing);
        assert_eq!(outcome, DropOutcome::Ignored);
        assert!(!classifier.is_dragging());

        classifier.begin(dragging("a.jpg"));
        let foreign = DropPayload::Internal(r#"{"type":"external","path":"a.jpg"}"#.to_string());
        assert_eq!(classifier.drop(Some(&sidebar("c1")), foreign, Mode::Browsing), DropOutcome::Ignored);
    }

    #[test]
    fn unclaimed_or_orphan_drops_are_ignored() {
        let mut classifier = DragClassifier::default();
        assert_eq!(classifier.drop(Some(&DropTarget::DropZone), internal("a.jpg"), Mode::Browsing), DropOutcome::Ignored);

        classifier.begin(dragging("a.jpg"));
        assert_eq!(classifier.drop(None, internal("a.jpg"), Mode::Browsing), DropOutcome::Ignored);
        assert!(!classifier.is_dragging());
    }

    #[test]
    fn payload_round_trips_through_json() {
        let raw = DropData::internal("/data/a b.jpg").to_json();
        assert_eq!(DropData::parse(&raw).unwrap().path, "/data/a b.jpg");
        assert!(matches!(DropData::parse("[]"), Err(GalleryError::DragPayload(_))));
    }
}
