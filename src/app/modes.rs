//! Viewing mode of the gallery session.
//!
//! The session is always in exactly one mode. The mode decides which load path
//! feeds the image list and whether infinite scroll is permitted:
//!
//! - **Browsing**: paginated listing of the current dataset
//! - **Searching**: one page of search results, no infinite scroll
//! - **`CollectionView`**: members of the active collection, reorderable
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::Mode;
//!
//! assert!(Mode::Browsing.allows_infinite_scroll());
//! assert!(!Mode::Searching.allows_infinite_scroll());
//! ```

/// Top-level viewing context of the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plain paginated listing of the selected dataset.
    #[default]
    Browsing,

    /// Results of a text or image-similarity search.
    ///
    /// Search results replace the list wholesale and are never appended to.
    Searching,

    /// Members of the active collection, in their persisted order.
    CollectionView,
}

impl Mode {
    /// Whether scrolling near the bottom may request the next page.
    #[must_use]
    pub const fn allows_infinite_scroll(self) -> bool {
        matches!(self, Self::Browsing | Self::CollectionView)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Browsing => "Browsing",
            Self::Searching => "Search results",
            Self::CollectionView => "Collection",
        }
    }
}
