//! Image set controller: the single owner of the gallery's image list.
//!
//! The controller holds the ordered list of [`ImageRecord`]s shown in the grid,
//! the pagination cursor, and the current [`Mode`]. No other component keeps its
//! own copy of the list; the reorder manager mutates it through
//! [`ImageSetController::move_item`] and everything else reads it.
//!
//! # Staleness
//!
//! Loads and searches are never cancelled. Instead every request carries a
//! [`Ticket`] stamped with the controller's epoch, and the epoch advances on every
//! context change (new mode, collection, dataset, or a refresh). A reply is
//! committed only when its ticket is the one in flight *and* its generation is the
//! current epoch. Anything else is discarded on arrival.
//!
//! # Mutual exclusion
//!
//! `loading` is a gate, not a queue. While a load or search is in flight, further
//! `load` and `search` calls are rejected. Context transitions are the exception:
//! they supersede the in-flight request by advancing the epoch.

use crate::app::modes::Mode;
use crate::domain::{ImageRecord, ImageSource};
use crate::storage::models::{
    CollectionMembers, ImagePage, SearchKind, SearchRequest, SearchResults,
};
use crate::worker::{ApiRequest, ApiResult, Ticket};

/// What the grid shows in place of, or alongside, the items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Ready,
    /// The last committed reply contained no images.
    Empty,
    /// The last load or search failed.
    Error(String),
}

/// The request currently holding the loading gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLoad {
    ticket: Ticket,
    page: u32,
    append: bool,
}

/// Owner of the current image set and its pagination state.
#[derive(Debug, Clone)]
pub struct ImageSetController {
    mode: Mode,
    dataset_id: Option<String>,
    active_collection_id: Option<String>,
    items: Vec<ImageRecord>,
    page: u32,
    page_size: u32,
    search_limit: u32,
    total_count: usize,
    loading: Option<PendingLoad>,
    epoch: u64,
    next_id: u64,
    status: ViewStatus,
}

impl ImageSetController {
    #[must_use]
    pub const fn new(page_size: u32, search_limit: u32) -> Self {
        Self {
            mode: Mode::Browsing,
            dataset_id: None,
            active_collection_id: None,
            items: Vec::new(),
            page: 1,
            page_size,
            search_limit,
            total_count: 0,
            loading: None,
            epoch: 0,
            next_id: 0,
            status: ViewStatus::Ready,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    #[must_use]
    pub fn active_collection_id(&self) -> Option<&str> {
        self.active_collection_id.as_deref()
    }

    #[must_use]
    pub fn items(&self) -> &[ImageRecord] {
        &self.items
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.items.len() < self.total_count
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    #[must_use]
    pub const fn status(&self) -> &ViewStatus {
        &self.status
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `collection_id` is the collection currently being viewed.
    #[must_use]
    pub fn is_viewing_collection(&self, collection_id: &str) -> bool {
        self.mode == Mode::CollectionView && self.active_collection_id() == Some(collection_id)
    }

    fn issue(&mut self) -> Ticket {
        self.next_id += 1;
        Ticket::new(self.next_id, self.epoch)
    }

    /// Starts a new context: supersedes the in-flight request and resets the list.
    fn transition(&mut self, mode: Mode, collection_id: Option<String>) {
        self.epoch += 1;
        self.loading = None;
        self.mode = mode;
        self.active_collection_id = collection_id;
        self.items.clear();
        self.page = 1;
        self.total_count = 0;
        self.status = ViewStatus::Ready;
        tracing::debug!(mode = ?mode, epoch = self.epoch, "context transition");
    }

    /// Requests `page` of the current context.
    ///
    /// Returns `None` (a no-op) while another load or search is in flight, in
    /// Searching mode, without a selected dataset, and for appends to a
    /// collection, which is always loaded whole.
    pub fn load(&mut self, page: u32, append: bool) -> Option<ApiRequest> {
        if let Some(pending) = self.loading {
            tracing::debug!(page, in_flight = pending.ticket.id, "load rejected: already loading");
            return None;
        }
        if self.mode == Mode::Searching {
            tracing::debug!(page, append, "load rejected: searching");
            return None;
        }
        let Some(dataset_id) = self.dataset_id.clone() else {
            tracing::debug!(page, "load rejected: no dataset selected");
            return None;
        };

        let request = match (self.mode, self.active_collection_id.clone()) {
            (Mode::CollectionView, Some(_)) if append => {
                tracing::debug!(page, "load rejected: collections are loaded whole");
                return None;
            }
            (Mode::CollectionView, Some(collection_id)) => {
                let ticket = self.issue();
                self.loading = Some(PendingLoad { ticket, page: 1, append: false });
                ApiRequest::collection_members(ticket, collection_id)
            }
            _ => {
                let ticket = self.issue();
                self.loading = Some(PendingLoad { ticket, page, append });
                ApiRequest::list_images(ticket, dataset_id, page, self.page_size)
            }
        };

        tracing::debug!(page, append, ticket = request.ticket().id, "load issued");
        Some(request)
    }

    /// Starts a search. Enters Searching mode and clears the list immediately.
    ///
    /// Rejected while a load or search is in flight, without a dataset, and for
    /// blank text queries or a missing image reference.
    pub fn search(
        &mut self,
        kind: SearchKind,
        query: Option<&str>,
        image: Option<&str>,
    ) -> Option<ApiRequest> {
        if self.loading.is_some() {
            tracing::debug!(kind = ?kind, "search rejected: already loading");
            return None;
        }
        let Some(dataset_id) = self.dataset_id.clone() else {
            tracing::debug!("search rejected: no dataset selected");
            return None;
        };
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let image = image.map(str::trim).filter(|i| !i.is_empty());
        let valid = match kind {
            SearchKind::Text => query.is_some(),
            SearchKind::Image => image.is_some(),
        };
        if !valid {
            tracing::debug!(kind = ?kind, "search rejected: nothing to search for");
            return None;
        }

        self.transition(Mode::Searching, None);
        let ticket = self.issue();
        self.loading = Some(PendingLoad { ticket, page: 1, append: false });

        tracing::debug!(kind = ?kind, ticket = ticket.id, "search issued");
        Some(ApiRequest::search(
            ticket,
            SearchRequest {
                dataset_id,
                kind,
                query: query.map(String::from),
                image: image.map(String::from),
                limit: self.search_limit,
                page: 1,
            },
        ))
    }

    /// Switches to `collection_id`, or back to Browsing with `None`.
    pub fn select_collection(&mut self, collection_id: Option<&str>) -> Option<ApiRequest> {
        match collection_id {
            Some(id) => self.transition(Mode::CollectionView, Some(id.to_string())),
            None => self.transition(Mode::Browsing, None),
        }
        self.load(1, false)
    }

    /// Switches dataset and returns to Browsing.
    pub fn select_dataset(&mut self, dataset_id: &str) -> Option<ApiRequest> {
        self.dataset_id = Some(dataset_id.to_string());
        self.transition(Mode::Browsing, None);
        self.load(1, false)
    }

    /// Leaves search and reloads page 1 of the dataset.
    pub fn clear_search(&mut self) -> Option<ApiRequest> {
        self.transition(Mode::Browsing, None);
        self.load(1, false)
    }

    /// Reloads page 1 of the current context in place.
    ///
    /// The current items stay visible until the reply replaces them.
    pub fn refresh(&mut self) -> Option<ApiRequest> {
        if self.mode == Mode::Searching {
            return None;
        }
        self.epoch += 1;
        self.loading = None;
        tracing::debug!(epoch = self.epoch, "refresh");
        self.load(1, false)
    }

    /// Takes the loading gate if `ticket` is the current in-flight request.
    fn accept(&mut self, ticket: Ticket) -> Option<PendingLoad> {
        match self.loading {
            Some(pending) if pending.ticket == ticket && ticket.generation == self.epoch => {
                self.loading = None;
                Some(pending)
            }
            _ => {
                tracing::debug!(
                    ticket = ticket.id,
                    generation = ticket.generation,
                    epoch = self.epoch,
                    "discarding stale reply"
                );
                None
            }
        }
    }

    fn normalize<'a>(&self, sources: impl Iterator<Item = ImageSource<'a>>) -> Vec<ImageRecord> {
        let dataset_id = self.dataset_id.as_deref().unwrap_or_default();
        sources
            .filter_map(|source| ImageRecord::normalize(source, dataset_id))
            .collect()
    }

    fn fail(&mut self, message: &str) {
        tracing::warn!(error = message, mode = ?self.mode, "load failed");
        self.status = ViewStatus::Error(message.to_string());
    }

    fn settle_status(&mut self) {
        self.status = if self.items.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        };
    }

    /// Commits a listing page. Returns whether the session changed.
    pub fn apply_page(&mut self, ticket: Ticket, result: &ApiResult<ImagePage>) -> bool {
        let Some(pending) = self.accept(ticket) else {
            return false;
        };

        match result {
            Ok(listing) => {
                let records = self.normalize(listing.images.iter().map(|image| image.source()));
                if pending.append {
                    self.items.extend(records);
                } else {
                    self.items = records;
                }
                self.page = pending.page;
                self.total_count = listing.total.unwrap_or_else(|| {
                    self.items.len() + usize::from(listing.has_more.unwrap_or(false))
                });
                self.settle_status();
                tracing::debug!(
                    page = self.page,
                    items = self.items.len(),
                    total = self.total_count,
                    "page committed"
                );
            }
            Err(failure) => self.fail(&failure.message),
        }
        true
    }

    /// Commits a collection's member listing, ordered by position.
    pub fn apply_members(&mut self, ticket: Ticket, result: &ApiResult<CollectionMembers>) -> bool {
        if self.accept(ticket).is_none() {
            return false;
        }

        match result {
            Ok(members) => {
                let mut ordered: Vec<_> = members.images.iter().collect();
                ordered.sort_by_key(|member| member.position.unwrap_or(usize::MAX));
                self.items = self.normalize(ordered.into_iter().map(|member| member.source()));
                self.page = 1;
                self.total_count = self.items.len();
                self.settle_status();
                tracing::debug!(items = self.items.len(), "collection committed");
            }
            Err(failure) => self.fail(&failure.message),
        }
        true
    }

    /// Commits search results.
    pub fn apply_search(&mut self, ticket: Ticket, result: &ApiResult<SearchResults>) -> bool {
        if self.accept(ticket).is_none() {
            return false;
        }

        match result {
            Ok(results) => {
                self.items = self.normalize(results.results.iter().map(|image| image.source()));
                self.page = 1;
                self.total_count = results.total.unwrap_or(self.items.len());
                self.settle_status();
                tracing::debug!(items = self.items.len(), total = self.total_count, "search committed");
            }
            Err(failure) => self.fail(&failure.message),
        }
        true
    }

    /// Moves the item at `from` to `to` with one remove and one insert.
    ///
    /// Returns `false` and leaves the list untouched for out-of-range indices or
    /// a move onto itself.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }
}
