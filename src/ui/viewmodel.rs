//! View model types representing renderable gallery state.
//!
//! View models are computed from the session via
//! [`GallerySession::compute_viewmodel`](crate::app::GallerySession::compute_viewmodel)
//! and consumed by the renderer. They contain no business logic, only
//! display-ready data: the UI is a pure function of these values.
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::ui::viewmodel::{GalleryViewModel, HeaderInfo, SearchBarInfo, Tile};
//!
//! let vm = GalleryViewModel {
//!     header: HeaderInfo { title: "Browsing".to_string(), dataset: None, total_count: 1 },
//!     search_bar: SearchBarInfo { query: String::new() },
//!     tiles: vec![Tile {
//!         identity: "a.jpg".to_string(),
//!         display_url: "/images/a.jpg?dataset_id=ds".to_string(),
//!         caption: None,
//!         is_dragging: false,
//!         is_drop_target: false,
//!     }],
//!     columns: 4,
//!     sidebar: vec![],
//!     empty_state: None,
//!     loading: false,
//!     has_more: false,
//!     processing: None,
//!     notice: None,
//!     preview: None,
//! };
//! assert_eq!(vm.tiles.len(), 1);
//! ```

/// Complete view model for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryViewModel {
    pub header: HeaderInfo,

    pub search_bar: SearchBarInfo,

    /// Grid cells in display order.
    pub tiles: Vec<Tile>,

    /// Number of grid columns.
    pub columns: u8,

    /// Collections sidebar entries.
    pub sidebar: Vec<SidebarEntry>,

    /// Placeholder shown instead of the grid (no dataset, no results, failure).
    pub empty_state: Option<EmptyState>,

    /// Whether a load or search is in flight.
    pub loading: bool,

    /// Whether scrolling further can load more images.
    pub has_more: bool,

    /// Background processing progress, e.g. `"Processing: 3/10"`.
    pub processing: Option<String>,

    /// Transient notice about a failed side operation.
    pub notice: Option<String>,

    /// Preview overlay, when open.
    pub preview: Option<PreviewInfo>,
}

/// Header display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Mode title, e.g. "Browsing" or "Collection: Favourites".
    pub title: String,

    /// Display name of the selected dataset.
    pub dataset: Option<String>,

    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub query: String,
}

/// Display information for one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub identity: String,
    pub display_url: String,
    pub caption: Option<String>,

    /// The cell being dragged.
    pub is_dragging: bool,

    /// The cell the drag currently hovers.
    pub is_drop_target: bool,
}

/// Display information for one collections sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: String,
    pub name: String,

    /// The collection currently being viewed.
    pub is_active: bool,

    /// Hovered by an in-flight drag.
    pub is_highlighted: bool,
}

/// Placeholder shown in place of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// Preview overlay contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub index: usize,
    pub total: usize,
    pub display_url: String,
    pub caption: Option<String>,
}
