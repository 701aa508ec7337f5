//! Backend worker executing the session's requests.
//!
//! The session emits backend requests as actions and receives their replies as
//! events; this module owns both sides of that protocol and the code that runs
//! a request against a [`Backend`](crate::storage::Backend).
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with staleness tickets
//! - `handler`: Worker implementation and request dispatch

pub mod handler;
pub mod messages;

pub use handler::GalleryWorker;
pub use messages::{ApiFailure, ApiRequest, ApiResponse, ApiResult, CollectionOp, FailureKind, Ticket};
