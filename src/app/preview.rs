//! Cursor of the image preview overlay.

use crate::domain::error::{GalleryError, Result};

/// Index of the previewed item, if the preview is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewCursor {
    index: Option<usize>,
}

impl PreviewCursor {
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.index
    }

    /// Opens the preview at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidState`] when there is nothing to preview or
    /// `index` is out of range. The cursor is left unchanged.
    pub fn open(&mut self, index: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Err(GalleryError::InvalidState("no images to preview".to_string()));
        }
        if index >= len {
            return Err(GalleryError::InvalidState(format!(
                "preview index {index} out of range for {len} images"
            )));
        }
        self.index = Some(index);
        Ok(())
    }

    pub fn close(&mut self) {
        self.index = None;
    }

    /// Moves to the next image, wrapping to the first. Returns whether it moved.
    pub fn next(&mut self, len: usize) -> bool {
        match self.index {
            Some(index) if len > 0 => {
                self.index = Some((index + 1) % len);
                true
            }
            _ => false,
        }
    }

    /// Moves to the previous image, wrapping to the last.
    pub fn previous(&mut self, len: usize) -> bool {
        match self.index {
            Some(index) if len > 0 => {
                self.index = Some(if index == 0 { len - 1 } else { (index - 1).min(len - 1) });
                true
            }
            _ => false,
        }
    }

    /// Closes the preview if the list shrank below the cursor.
    pub fn clamp(&mut self, len: usize) {
        if self.index.is_some_and(|index| index >= len) {
            self.index = None;
        }
    }
}
