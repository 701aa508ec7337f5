//! Application layer: the gallery's interaction and synchronization orchestrator.
//!
//! This module sits between the runtime and the storage/worker layers. It owns
//! every piece of client state and decides, for each event, what changes and
//! which side effects to request. It performs no I/O itself.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Input / Timers → Events → Event Handler → Session Mutations → Actions → Side Effects
//!                                     ↑                                         ↓
//!                                     └────────────── Api Responses ────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`controller`]: Image set controller, sole owner of the image list
//! - [`debounce`]: Debounced input gate for the search box
//! - [`drag`]: Drag intent classifier
//! - [`handler`]: Event processing logic and component coordination
//! - [`modes`]: Browsing / Searching / `CollectionView`
//! - [`poller`]: Background processing status poller
//! - [`preview`]: Preview overlay cursor
//! - [`reorder`]: Optimistic reorder manager
//! - [`scroll`]: Rate-limited infinite scroll trigger
//! - [`state`]: Session aggregate and view model computation

pub mod actions;
pub mod controller;
pub mod debounce;
pub mod drag;
pub mod handler;
pub mod modes;
pub mod poller;
pub mod preview;
pub mod reorder;
pub mod scroll;
pub mod state;

pub use actions::{Action, TimerKind};
pub use controller::{ImageSetController, ViewStatus};
pub use drag::{DropPayload, DropTarget};
pub use handler::{handle_event, Event};
pub use modes::Mode;
pub use scroll::ScrollMetrics;
pub use state::GallerySession;
