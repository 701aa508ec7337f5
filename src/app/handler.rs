//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes user input, timer
//! expiries, and backend replies, translating them into session mutations and
//! action sequences. It is the only place that coordinates the orchestrator's
//! components with each other.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the runtime (user input, timers, worker replies)
//! 2. [`handle_event`] pattern-matches the event type
//! 3. Components of the [`GallerySession`] mutate their own state
//! 4. Actions are collected and returned for execution
//!
//! # Event Types
//!
//! - **Lifecycle**: `Init`
//! - **Navigation**: `SelectDataset`, `SelectCollection`, `Refresh`, `Scrolled`
//! - **Search**: `SearchInput`
//! - **Drag and drop**: `DragStarted`, `DragOver`, `Dropped`, `DragEnded`
//! - **Collections**: `CreateCollection`, `RenameCollection`, `DeleteCollection`,
//!   `RemoveFromCollection`
//! - **Preview**: `OpenPreview`, `PreviewNext`, `PreviewPrevious`, `ClosePreview`
//! - **System**: `TimerFired`, `Api` with typed reply variants
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::{handle_event, Action, Event, GallerySession};
//! use tapestry_client::storage::Preferences;
//! use tapestry_client::Config;
//!
//! let mut session = GallerySession::new(&Config::default(), Preferences::default());
//! let (_render, actions) = handle_event(&mut session, &Event::Init)?;
//! assert!(actions.iter().all(|a| matches!(a, Action::Call(_))));
//! # Ok::<(), tapestry_client::GalleryError>(())
//! ```

use crate::app::actions::TimerKind;
use crate::app::debounce::SearchIntent;
use crate::app::drag::{DropOutcome, DropPayload, DropTarget};
use crate::app::modes::Mode;
use crate::app::poller::PollOutcome;
use crate::app::scroll::{ScrollDecision, ScrollMetrics};
use crate::app::{Action, GallerySession};
use crate::domain::error::Result;
use crate::storage::models::{SearchKind, UploadFile};
use crate::worker::{ApiRequest, ApiResponse, CollectionOp};
use std::time::Instant;

/// Events triggered by user input, timers, or backend replies.
///
/// The handler processes events sequentially, one at a time, which is what
/// makes the session's state transitions deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Startup: lists datasets and collections and selects the preferred dataset.
    Init,

    /// The search box now contains this text.
    SearchInput(String),

    /// A timer started by [`Action::StartTimer`] expired.
    TimerFired {
        timer: TimerKind,
        token: u64,
        at: Instant,
    },

    /// The grid viewport scrolled.
    Scrolled { metrics: ScrollMetrics, at: Instant },

    SelectDataset(String),

    /// Views a collection, or returns to Browsing with `None`.
    SelectCollection(Option<String>),

    /// Reloads page 1 of the current context.
    Refresh,

    /// A drag began. `source_index` is `None` for files from outside the gallery.
    DragStarted { source_index: Option<usize> },

    /// A drop target reports itself as hovered.
    DragOver { target: DropTarget },

    /// The drag was released. `target` is the surface that claimed the drop.
    Dropped {
        target: Option<DropTarget>,
        payload: DropPayload,
    },

    /// The drag ended without a drop.
    DragEnded,

    CreateCollection { name: String },

    RenameCollection { collection_id: String, name: String },

    DeleteCollection { collection_id: String },

    RemoveFromCollection { collection_id: String, identity: String },

    OpenPreview(usize),

    PreviewNext,

    PreviewPrevious,

    ClosePreview,

    /// The user picked a column count for a container of the given width.
    SetGridColumns { requested: u32, container_width: u32 },

    /// A file chosen through the file input.
    Upload(UploadFile),

    DismissNotice,

    /// Wraps a reply from the backend worker.
    Api(ApiResponse),
}

impl Event {
    /// Short event name for spans; avoids dumping payloads such as file bytes.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SearchInput(_) => "search_input",
            Self::TimerFired { .. } => "timer_fired",
            Self::Scrolled { .. } => "scrolled",
            Self::SelectDataset(_) => "select_dataset",
            Self::SelectCollection(_) => "select_collection",
            Self::Refresh => "refresh",
            Self::DragStarted { .. } => "drag_started",
            Self::DragOver { .. } => "drag_over",
            Self::Dropped { .. } => "dropped",
            Self::DragEnded => "drag_ended",
            Self::CreateCollection { .. } => "create_collection",
            Self::RenameCollection { .. } => "rename_collection",
            Self::DeleteCollection { .. } => "delete_collection",
            Self::RemoveFromCollection { .. } => "remove_from_collection",
            Self::OpenPreview(_) => "open_preview",
            Self::PreviewNext => "preview_next",
            Self::PreviewPrevious => "preview_previous",
            Self::ClosePreview => "close_preview",
            Self::SetGridColumns { .. } => "set_grid_columns",
            Self::Upload(_) => "upload",
            Self::DismissNotice => "dismiss_notice",
            Self::Api(_) => "api",
        }
    }
}

fn call(request: Option<ApiRequest>) -> Vec<Action> {
    request.map(Action::Call).into_iter().collect()
}

/// Processes an event, mutates the session, and returns actions to execute.
///
/// Returns `(should_render, actions)`. `should_render` is `true` whenever the
/// view model may have changed; actions are executed in order by the runtime.
///
/// # Errors
///
/// Currently infallible: every failure in the orchestrator degrades to an
/// error placeholder or notice. The `Result` leaves room for fatal conditions.
///
/// # Tracing
///
/// Each call creates a debug-level span with the event name.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut GallerySession, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event = event.name()).entered();

    match event {
        Event::Init => {
            let mut actions = vec![
                Action::Call(ApiRequest::list_datasets(state.issue_ticket())),
                Action::Call(ApiRequest::list_collections(state.issue_ticket())),
            ];
            if let Some(dataset_id) = state.preferred_dataset.clone() {
                actions.extend(select_dataset(state, &dataset_id));
            }
            Ok((true, actions))
        }

        Event::SearchInput(text) => {
            state.search_text.clone_from(text);
            let token = state.search_gate.submit(text);
            Ok((
                true,
                vec![Action::StartTimer {
                    timer: TimerKind::Debounce,
                    token,
                    after: state.search_gate.delay(),
                }],
            ))
        }

        Event::TimerFired { timer, token, at } => Ok(handle_timer(state, *timer, *token, *at)),

        Event::Scrolled { metrics, at } => match state.scroll.on_scroll(*metrics, *at) {
            ScrollDecision::Check(metrics) => Ok(check_scroll(state, &metrics)),
            ScrollDecision::Defer { token, after } => Ok((
                false,
                vec![Action::StartTimer {
                    timer: TimerKind::Scroll,
                    token,
                    after,
                }],
            )),
            ScrollDecision::Coalesced => Ok((false, vec![])),
        },

        Event::SelectDataset(dataset_id) => Ok((true, select_dataset(state, dataset_id))),

        Event::SelectCollection(collection_id) => {
            reset_transients(state);
            Ok((true, call(state.controller.select_collection(collection_id.as_deref()))))
        }

        Event::Refresh => Ok((true, call(state.controller.refresh()))),

        Event::DragStarted { source_index } => {
            let source = match source_index {
                Some(index) => match state.controller.items().get(*index) {
                    Some(item) => Some(item.identity.clone()),
                    None => {
                        tracing::debug!(source_index, "drag from unknown grid slot ignored");
                        return Ok((false, vec![]));
                    }
                },
                None => None,
            };
            state.drag.begin(source);
            Ok((true, vec![]))
        }

        Event::DragOver { target } => Ok(handle_drag_over(state, target)),

        Event::Dropped { target, payload } => Ok(handle_drop(state, target.as_ref(), payload)),

        Event::DragEnded => {
            state.drag.cancel();
            Ok((true, vec![]))
        }

        Event::CreateCollection { name } => {
            if name.trim().is_empty() {
                tracing::debug!("blank collection name rejected");
                return Ok((false, vec![]));
            }
            let ticket = state.issue_ticket();
            Ok((false, vec![Action::Call(ApiRequest::create_collection(ticket, name.trim().to_string()))]))
        }

        Event::RenameCollection { collection_id, name } => {
            if name.trim().is_empty() {
                tracing::debug!(collection_id = %collection_id, "blank collection name rejected");
                return Ok((false, vec![]));
            }
            let ticket = state.issue_ticket();
            Ok((
                false,
                vec![Action::Call(ApiRequest::rename_collection(
                    ticket,
                    collection_id.clone(),
                    name.trim().to_string(),
                ))],
            ))
        }

        Event::DeleteCollection { collection_id } => {
            let ticket = state.issue_ticket();
            Ok((false, vec![Action::Call(ApiRequest::delete_collection(ticket, collection_id.clone()))]))
        }

        Event::RemoveFromCollection { collection_id, identity } => {
            let ticket = state.issue_ticket();
            Ok((
                false,
                vec![Action::Call(ApiRequest::remove_from_collection(
                    ticket,
                    collection_id.clone(),
                    vec![identity.clone()],
                ))],
            ))
        }

        Event::OpenPreview(index) => {
            let len = state.controller.items().len();
            match state.preview.open(*index, len) {
                Ok(()) => Ok((true, vec![])),
                Err(e) => {
                    tracing::debug!(error = %e, "preview not opened");
                    Ok((false, vec![]))
                }
            }
        }

        Event::PreviewNext => {
            let len = state.controller.items().len();
            Ok((state.preview.next(len), vec![]))
        }

        Event::PreviewPrevious => {
            let len = state.controller.items().len();
            Ok((state.preview.previous(len), vec![]))
        }

        Event::ClosePreview => {
            state.preview.close();
            Ok((true, vec![]))
        }

        Event::SetGridColumns {
            requested,
            container_width,
        } => {
            let preferences = state.preferences.with_grid_columns(*requested, *container_width);
            if preferences.grid_columns == state.preferences.grid_columns {
                return Ok((false, vec![]));
            }
            tracing::debug!(columns = preferences.grid_columns, "grid columns changed");
            state.preferences = preferences.clone();
            Ok((true, vec![Action::SavePreferences(preferences)]))
        }

        Event::Upload(file) => Ok(start_upload(state, file.clone())),

        Event::DismissNotice => Ok((state.notice.take().is_some(), vec![])),

        Event::Api(response) => Ok(handle_response(state, response)),
    }
}

/// Clears per-context UI state before a context transition.
fn reset_transients(state: &mut GallerySession) {
    state.preview.close();
    state.drag.cancel();
    state.search_text.clear();
}

fn select_dataset(state: &mut GallerySession, dataset_id: &str) -> Vec<Action> {
    reset_transients(state);
    let mut actions = call(state.controller.select_dataset(dataset_id));
    actions.push(Action::Call(state.poller.start(dataset_id)));
    actions
}

fn handle_timer(state: &mut GallerySession, timer: TimerKind, token: u64, at: Instant) -> (bool, Vec<Action>) {
    match timer {
        TimerKind::Debounce => match state.search_gate.fire(token) {
            Some(SearchIntent::Search(query)) => {
                let request = state.controller.search(SearchKind::Text, Some(&query), None);
                if request.is_none() {
                    return (false, vec![]);
                }
                state.preview.close();
                (true, call(request))
            }
            Some(SearchIntent::Clear) if state.controller.mode() == Mode::CollectionView => {
                tracing::debug!("empty search box while viewing a collection");
                (false, vec![])
            }
            Some(SearchIntent::Clear) => {
                state.preview.close();
                (true, call(state.controller.clear_search()))
            }
            None => (false, vec![]),
        },

        TimerKind::Scroll => match state.scroll.on_timer(token, at) {
            Some(metrics) => check_scroll(state, &metrics),
            None => (false, vec![]),
        },

        TimerKind::Poll => (false, call(state.poller.on_timer(token))),
    }
}

/// Requests the next page when the viewport is near the bottom and the gates allow it.
fn check_scroll(state: &mut GallerySession, metrics: &ScrollMetrics) -> (bool, Vec<Action>) {
    let controller = &mut state.controller;
    if !state.scroll.near_bottom(metrics)
        || !controller.mode().allows_infinite_scroll()
        || controller.is_loading()
        || !controller.has_more()
    {
        return (false, vec![]);
    }

    let next_page = controller.page() + 1;
    tracing::debug!(page = next_page, "scroll trigger fired");
    let request = controller.load(next_page, true);
    (request.is_some(), call(request))
}

fn handle_drag_over(state: &mut GallerySession, target: &DropTarget) -> (bool, Vec<Action>) {
    let highlight_changed = state.drag.hover(target);

    let DropTarget::GridItem { index } = target else {
        return (highlight_changed, vec![]);
    };
    let Some(source) = state.drag.gesture().and_then(|g| g.source.as_deref()) else {
        return (highlight_changed, vec![]);
    };
    let Some(from) = state.controller.items().iter().position(|item| item.identity == source) else {
        tracing::debug!(source, "dragged image no longer in the list");
        return (highlight_changed, vec![]);
    };
    if state.controller.mode() != Mode::CollectionView || from == *index {
        return (highlight_changed, vec![]);
    }

    match state.reorder.step(&mut state.controller, from, *index) {
        Some(request) => {
            state.preview.close();
            (true, vec![Action::Call(request)])
        }
        None => (highlight_changed, vec![]),
    }
}

fn handle_drop(state: &mut GallerySession, target: Option<&DropTarget>, payload: &DropPayload) -> (bool, Vec<Action>) {
    let mode = state.controller.mode();

    match state.drag.drop(target, payload.clone(), mode) {
        DropOutcome::Reorder { index } => {
            tracing::debug!(index, "reorder gesture finished");
            (true, vec![])
        }
        DropOutcome::AddToCollection {
            collection_id,
            identity,
        } => {
            let ticket = state.issue_ticket();
            (
                true,
                vec![Action::Call(ApiRequest::add_to_collection(
                    ticket,
                    collection_id,
                    vec![identity],
                ))],
            )
        }
        DropOutcome::SearchByImage { identity } => {
            let request = state.controller.search(SearchKind::Image, None, Some(&identity));
            if request.is_some() {
                state.preview.close();
                state.search_text.clear();
            }
            (true, call(request))
        }
        DropOutcome::Upload { file } => {
            let (_, actions) = start_upload(state, file);
            (true, actions)
        }
        DropOutcome::Ignored => (true, vec![]),
    }
}

fn start_upload(state: &mut GallerySession, file: UploadFile) -> (bool, Vec<Action>) {
    if !file.is_image() {
        tracing::debug!(name = %file.name, content_type = %file.content_type, "non-image upload rejected");
        state.notice = Some(format!("{} is not an image", file.name));
        return (true, vec![]);
    }
    let Some(dataset_id) = state.controller.dataset_id().map(String::from) else {
        tracing::debug!(name = %file.name, "upload without a dataset rejected");
        state.notice = Some("Select a dataset before uploading".to_string());
        return (true, vec![]);
    };

    tracing::debug!(name = %file.name, bytes = file.bytes.len(), "upload started");
    let ticket = state.issue_ticket();
    (false, vec![Action::Call(ApiRequest::upload(ticket, dataset_id, file))])
}

#[allow(clippy::too_many_lines)]
fn handle_response(state: &mut GallerySession, response: &ApiResponse) -> (bool, Vec<Action>) {
    match response {
        ApiResponse::PageLoaded { ticket, result } => {
            let status = result.as_ref().ok().and_then(|page| page.processing_status);
            let changed = state.controller.apply_page(*ticket, result);
            if changed {
                if let Some(status) = status {
                    state.poller.show(status);
                }
                state.preview.clamp(state.controller.items().len());
            }
            (changed, vec![])
        }

        ApiResponse::MembersLoaded { ticket, result } => {
            let changed = state.controller.apply_members(*ticket, result);
            if changed {
                state.preview.clamp(state.controller.items().len());
            }
            (changed, vec![])
        }

        ApiResponse::SearchCompleted { ticket, result } => {
            let changed = state.controller.apply_search(*ticket, result);
            (changed, vec![])
        }

        ApiResponse::CollectionsListed { result, .. } => match result {
            Ok(list) => {
                state.collections.clone_from(&list.collections);
                (true, vec![])
            }
            Err(failure) => {
                state.notice = Some(format!("Could not load collections: {failure}"));
                (true, vec![])
            }
        },

        ApiResponse::CollectionCreated { result, .. } => match result {
            Ok(collection) => {
                tracing::debug!(collection_id = %collection.id, name = %collection.name, "collection created");
                let ticket = state.issue_ticket();
                (false, vec![Action::Call(ApiRequest::list_collections(ticket))])
            }
            Err(failure) => {
                state.notice = Some(format!("Could not create collection: {failure}"));
                (true, vec![])
            }
        },

        ApiResponse::CollectionChanged { op, result, .. } => {
            if let Err(failure) = result {
                let what = match op {
                    CollectionOp::Renamed { .. } => "rename collection",
                    CollectionOp::Deleted { .. } => "delete collection",
                    CollectionOp::ImagesAdded { .. } => "add image to collection",
                    CollectionOp::ImagesRemoved { .. } => "remove image from collection",
                };
                state.notice = Some(format!("Could not {what}: {failure}"));
                return (true, vec![]);
            }

            match op {
                CollectionOp::Renamed { .. } => {
                    let ticket = state.issue_ticket();
                    (false, vec![Action::Call(ApiRequest::list_collections(ticket))])
                }
                CollectionOp::Deleted { collection_id } => {
                    let ticket = state.issue_ticket();
                    let mut actions = vec![Action::Call(ApiRequest::list_collections(ticket))];
                    if state.controller.active_collection_id() == Some(collection_id.as_str()) {
                        reset_transients(state);
                        actions.extend(call(state.controller.select_collection(None)));
                    }
                    (true, actions)
                }
                CollectionOp::ImagesAdded { collection_id } | CollectionOp::ImagesRemoved { collection_id } => {
                    if state.controller.is_viewing_collection(collection_id) {
                        (true, call(state.controller.refresh()))
                    } else {
                        (false, vec![])
                    }
                }
            }
        }

        ApiResponse::OrderPersisted {
            collection_id, result, ..
        } => {
            let reload = state.reorder.on_persisted(&mut state.controller, collection_id, result);
            (reload.is_some(), call(reload))
        }

        ApiResponse::Uploaded { result, .. } => match result {
            Ok(receipt) if receipt.success => {
                let Some(filename) = receipt.filename.clone().filter(|f| !f.is_empty()) else {
                    tracing::warn!("upload succeeded without a filename");
                    return (false, vec![]);
                };
                tracing::debug!(filename = %filename, "upload finished");

                match state.controller.active_collection_id().map(String::from) {
                    Some(collection_id) if state.controller.mode() == Mode::CollectionView => {
                        let ticket = state.issue_ticket();
                        (
                            false,
                            vec![Action::Call(ApiRequest::add_to_collection(
                                ticket,
                                collection_id,
                                vec![filename],
                            ))],
                        )
                    }
                    _ => {
                        let request = state.controller.search(SearchKind::Image, None, Some(&filename));
                        if request.is_none() {
                            return (false, vec![]);
                        }
                        state.preview.close();
                        state.search_text.clear();
                        (true, call(request))
                    }
                }
            }
            Ok(receipt) => {
                let reason = receipt.error.clone().unwrap_or_else(|| "Upload failed".to_string());
                state.notice = Some(reason);
                (true, vec![])
            }
            Err(failure) => {
                state.notice = Some(format!("Upload failed: {failure}"));
                (true, vec![])
            }
        },

        ApiResponse::StatusPolled {
            ticket,
            dataset_id,
            result,
        } => match state.poller.on_status(*ticket, dataset_id, result) {
            PollOutcome::Discarded => (false, vec![]),
            PollOutcome::Continue { token, after } => (
                true,
                vec![Action::StartTimer {
                    timer: TimerKind::Poll,
                    token,
                    after,
                }],
            ),
            PollOutcome::Stopped => (true, vec![]),
        },

        ApiResponse::DatasetsListed { result, .. } => match result {
            Ok(list) => {
                state.datasets.clone_from(&list.datasets);
                if state.controller.dataset_id().is_some() {
                    return (true, vec![]);
                }
                let preferred = state
                    .preferred_dataset
                    .as_deref()
                    .filter(|id| list.datasets.iter().any(|d| d.id == *id))
                    .map(String::from);
                match preferred.or_else(|| list.datasets.first().map(|d| d.id.clone())) {
                    Some(dataset_id) => (true, select_dataset(state, &dataset_id)),
                    None => (true, vec![]),
                }
            }
            Err(failure) => {
                state.notice = Some(format!("Could not load datasets: {failure}"));
                (true, vec![])
            }
        },
    }
}
