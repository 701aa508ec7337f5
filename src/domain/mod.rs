//! Domain layer for the gallery client.
//!
//! This module contains the core domain types, independent of HTTP, timers, or
//! rendering concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`image`]: Image records and display URL resolution
//! - [`collection`]: Collections, datasets, ordering batches, processing status
//!
//! # Examples
//!
//! ```
//! use tapestry_client::domain::{ImageRecord, ImageSource, ReorderBatch};
//!
//! let record = ImageRecord::normalize(
//!     ImageSource { filename: Some("sunset.jpg"), ..Default::default() },
//!     "holidays",
//! ).unwrap();
//! let batch = ReorderBatch::from_items(&[record]);
//! assert_eq!(batch.positions[0].position, 0);
//! ```

pub mod collection;
pub mod error;
pub mod image;

pub use collection::{Collection, Dataset, PositionEntry, ProcessingStatus, ReorderBatch};
pub use error::{GalleryError, Result};
pub use image::{resolve_display_url, ImageRecord, ImageSource};
