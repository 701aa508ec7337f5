//! Collections, datasets, ordering batches and processing status.

use super::image::ImageRecord;
use serde::{Deserialize, Serialize};

/// A named, user-ordered subset of a dataset's images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

/// A namespace of images. Image identities are unique within one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
}

/// Progress of the backend's long-running embedding job for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingStatus {
    #[serde(default)]
    pub is_processing: bool,
    #[serde(default)]
    pub processed_count: u64,
    #[serde(default)]
    pub total_count: u64,
}

impl ProcessingStatus {
    /// Short progress label, e.g. `"Processing: 12/40"`. `None` when idle.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.is_processing
            .then(|| format!("Processing: {}/{}", self.processed_count, self.total_count))
    }
}

/// A single `{path, position}` assignment within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub path: String,
    pub position: usize,
}

/// The complete ordering of a collection, persisted as one atomic request.
///
/// Always derived from the full current item list: exactly one entry per item,
/// positions `0..n` in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReorderBatch {
    pub positions: Vec<PositionEntry>,
}

impl ReorderBatch {
    /// Derives the batch for the given display order.
    #[must_use]
    pub fn from_items(items: &[ImageRecord]) -> Self {
        let positions = items
            .iter()
            .enumerate()
            .map(|(position, item)| PositionEntry {
                path: item.identity.clone(),
                position,
            })
            .collect();
        Self { positions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
