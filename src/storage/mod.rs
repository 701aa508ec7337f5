//! Storage layer: the remote gallery backend and local preference persistence.
//!
//! # Modules
//!
//! - `backend`: Backend trait abstraction over the gallery service
//! - `http`: `reqwest` implementation of the backend
//! - `models`: Wire types separate from domain models
//! - `preferences`: JSON file store for the grid column preference

pub mod backend;
pub mod http;
pub mod models;
pub mod preferences;

pub use backend::Backend;
pub use http::HttpBackend;
pub use models::{
    CollectionList, CollectionMember, CollectionMembers, DatasetList, ImagePage, SearchKind,
    SearchRequest, SearchResults, UploadFile, UploadReceipt, WireImage, WireImageRecord,
};
pub use preferences::{PreferenceStore, Preferences};
