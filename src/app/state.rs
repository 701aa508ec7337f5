//! Session state and view model computation.
//!
//! This module defines [`GallerySession`], the aggregate of every orchestrator
//! component for one gallery session, and the computation that turns it into a
//! renderable [`GalleryViewModel`].
//!
//! # Architecture
//!
//! The session owns its components by value and is mutated only by
//! [`handle_event`](crate::app::handle_event). The image list lives in the
//! [`ImageSetController`]; every other component either reads it or asks the
//! controller to change it.
//!
//! # View Model Computation
//!
//! [`GallerySession::compute_viewmodel`] is a pure function of the session. The
//! renderer never looks at the session directly, so any change to the items is
//! reflected by recomputing the whole view model.
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::GallerySession;
//! use tapestry_client::storage::Preferences;
//! use tapestry_client::Config;
//!
//! let session = GallerySession::new(&Config::default(), Preferences::default());
//! let viewmodel = session.compute_viewmodel();
//! assert!(viewmodel.tiles.is_empty());
//! assert_eq!(viewmodel.columns, 4);
//! ```

use super::controller::{ImageSetController, ViewStatus};
use super::debounce::DebounceGate;
use super::drag::{DragClassifier, DropData, DropTarget};
use super::modes::Mode;
use super::poller::StatusPoller;
use super::preview::PreviewCursor;
use super::reorder::ReorderManager;
use super::scroll::ScrollTrigger;
use crate::domain::{Collection, Dataset};
use crate::storage::Preferences;
use crate::ui::viewmodel::{
    EmptyState, GalleryViewModel, HeaderInfo, PreviewInfo, SearchBarInfo, SidebarEntry, Tile,
};
use crate::worker::Ticket;
use crate::Config;

/// Live state of one gallery session.
#[derive(Debug, Clone)]
pub struct GallerySession {
    /// Owner of the image list, pagination, and mode.
    pub controller: ImageSetController,

    /// Debounce gate of the search box.
    pub search_gate: DebounceGate,

    /// Current contents of the search box.
    pub search_text: String,

    pub drag: DragClassifier,

    pub reorder: ReorderManager,

    pub poller: StatusPoller,

    pub scroll: ScrollTrigger,

    pub preview: PreviewCursor,

    /// Datasets offered by the backend.
    pub datasets: Vec<Dataset>,

    /// Collections shown in the sidebar.
    pub collections: Vec<Collection>,

    /// Persisted user preferences.
    pub preferences: Preferences,

    /// Transient message about a failed side operation.
    ///
    /// Load and search failures are shown through the controller's status
    /// instead.
    pub notice: Option<String>,

    /// Dataset to select on startup, if configured.
    pub preferred_dataset: Option<String>,

    next_ticket: u64,
}

impl GallerySession {
    /// Creates an empty session. Nothing is loaded until `Event::Init`.
    #[must_use]
    pub fn new(config: &Config, preferences: Preferences) -> Self {
        Self {
            controller: ImageSetController::new(config.page_size, config.search_limit),
            search_gate: DebounceGate::new(config.debounce()),
            search_text: String::new(),
            drag: DragClassifier::default(),
            reorder: ReorderManager::default(),
            poller: StatusPoller::new(config.poll_interval()),
            scroll: ScrollTrigger::new(config.scroll_threshold_px, config.scroll_interval()),
            preview: PreviewCursor::default(),
            datasets: Vec::new(),
            collections: Vec::new(),
            preferences,
            notice: None,
            preferred_dataset: config.dataset_id.clone(),
            next_ticket: 0,
        }
    }

    /// Issues a ticket for requests that are not subject to staleness checks.
    pub(crate) fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket::new(self.next_ticket, 0)
    }

    /// Drag payload for the item at `index`, for the drag data transfer.
    #[must_use]
    pub fn drag_payload(&self, index: usize) -> Option<String> {
        self.controller
            .items()
            .get(index)
            .map(|item| DropData::internal(&item.identity).to_json())
    }

    fn dataset_name(&self) -> Option<String> {
        let id = self.controller.dataset_id()?;
        Some(
            self.datasets
                .iter()
                .find(|d| d.id == id)
                .map_or_else(|| id.to_string(), |d| d.name.clone()),
        )
    }

    fn collection_name(&self, id: &str) -> String {
        self.collections
            .iter()
            .find(|c| c.id == id)
            .map_or_else(|| id.to_string(), |c| c.name.clone())
    }

    /// Computes a view model for rendering.
    #[must_use]
    pub fn compute_viewmodel(&self) -> GalleryViewModel {
        let gesture = self.drag.gesture();
        let hover = gesture.and_then(|g| g.hover.as_ref());
        let dragged = gesture.and_then(|g| g.source.as_deref());

        let tiles = self
            .controller
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| Tile {
                identity: item.identity.clone(),
                display_url: item.display_url.clone(),
                caption: item.annotation.clone(),
                is_dragging: dragged == Some(item.identity.as_str()),
                is_drop_target: hover == Some(&DropTarget::GridItem { index }),
            })
            .collect();

        let sidebar = self
            .collections
            .iter()
            .map(|collection| SidebarEntry {
                id: collection.id.clone(),
                name: collection.name.clone(),
                is_active: self.controller.active_collection_id() == Some(collection.id.as_str()),
                is_highlighted: matches!(
                    hover,
                    Some(DropTarget::CollectionsSidebar { collection_id }) if *collection_id == collection.id
                ),
            })
            .collect();

        let preview = self.preview.current().and_then(|index| {
            self.controller.items().get(index).map(|item| PreviewInfo {
                index,
                total: self.controller.items().len(),
                display_url: item.display_url.clone(),
                caption: item.annotation.clone(),
            })
        });

        GalleryViewModel {
            header: self.compute_header(),
            search_bar: SearchBarInfo {
                query: self.search_text.clone(),
            },
            tiles,
            columns: self.preferences.grid_columns,
            sidebar,
            empty_state: self.compute_empty_state(),
            loading: self.controller.is_loading(),
            has_more: self.controller.has_more(),
            processing: self.poller.status().and_then(|status| status.label()),
            notice: self.notice.clone(),
            preview,
        }
    }

    fn compute_header(&self) -> HeaderInfo {
        let mode = self.controller.mode();
        let title = match (mode, self.controller.active_collection_id()) {
            (Mode::CollectionView, Some(id)) => format!("Collection: {}", self.collection_name(id)),
            _ => mode.label().to_string(),
        };

        HeaderInfo {
            title,
            dataset: self.dataset_name(),
            total_count: self.controller.total_count(),
        }
    }

    fn compute_empty_state(&self) -> Option<EmptyState> {
        if self.controller.dataset_id().is_none() {
            return Some(EmptyState {
                message: "No dataset selected".to_string(),
                subtitle: "Pick a dataset to start browsing".to_string(),
            });
        }

        match self.controller.status() {
            ViewStatus::Error(message) => Some(EmptyState {
                message: if self.controller.mode() == Mode::Searching {
                    "Search failed".to_string()
                } else {
                    "Failed to load images".to_string()
                },
                subtitle: message.clone(),
            }),
            ViewStatus::Empty if self.controller.items().is_empty() => Some(EmptyState {
                message: "No images found".to_string(),
                subtitle: String::new(),
            }),
            _ => None,
        }
    }
}
