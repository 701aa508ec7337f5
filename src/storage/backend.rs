//! Gallery backend abstraction.
//!
//! This module defines the [`Backend`] trait that abstracts over the remote gallery
//! service. The worker executes every request through this trait, which allows the
//! HTTP implementation to be swapped for a recording fake in tests.
//!
//! # Design Philosophy
//!
//! The trait is minimal and maps one method to one REST operation. Methods return
//! boxed futures so the trait stays object-safe and the runtime can hold an
//! `Arc<dyn Backend>`.

use crate::domain::error::Result;
use crate::domain::{Collection, ProcessingStatus, ReorderBatch};
use crate::storage::models::{
    CollectionList, CollectionMembers, DatasetList, ImagePage, SearchRequest, SearchResults,
    UploadFile, UploadReceipt,
};
use futures_util::future::BoxFuture;

/// Abstraction over the remote gallery service.
///
/// # Implementations
///
/// - [`HttpBackend`](crate::storage::HttpBackend): JSON over HTTP via `reqwest`
///
/// # Examples
///
/// ```no_run
/// use tapestry_client::storage::{Backend, HttpBackend};
///
/// # async fn demo() -> tapestry_client::Result<()> {
/// let backend = HttpBackend::new("http://localhost:5000")?;
/// let datasets = backend.list_datasets().await?;
/// println!("{} datasets", datasets.datasets.len());
/// # Ok(())
/// # }
/// ```
pub trait Backend: Send + Sync {
    /// `GET /images?dataset_id&page&per_page`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn list_images(&self, dataset_id: &str, page: u32, per_page: u32) -> BoxFuture<'_, Result<ImagePage>>;

    /// `GET /collections/{id}`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn collection_members(&self, collection_id: &str) -> BoxFuture<'_, Result<CollectionMembers>>;

    /// `POST /search`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn search(&self, request: &SearchRequest) -> BoxFuture<'_, Result<SearchResults>>;

    /// `GET /collections`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn list_collections(&self) -> BoxFuture<'_, Result<CollectionList>>;

    /// `POST /collections {name}`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn create_collection(&self, name: &str) -> BoxFuture<'_, Result<Collection>>;

    /// `PATCH /collections/{id} {name}`
    ///
    /// # Errors
    ///
    /// Returns transport or backend errors.
    fn rename_collection(&self, collection_id: &str, name: &str) -> BoxFuture<'_, Result<()>>;

    /// `DELETE /collections/{id}`
    ///
    /// # Errors
    ///
    /// Returns transport or backend errors.
    fn delete_collection(&self, collection_id: &str) -> BoxFuture<'_, Result<()>>;

    /// `POST /collections/{id}/images {image_paths}`
    ///
    /// # Errors
    ///
    /// Returns transport or backend errors.
    fn add_to_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>>;

    /// `DELETE /collections/{id}/images {image_paths}`
    ///
    /// # Errors
    ///
    /// Returns transport or backend errors.
    fn remove_from_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>>;

    /// `PATCH /collections/{id}/positions {positions}`
    ///
    /// # Errors
    ///
    /// Returns transport or backend errors.
    fn persist_order(&self, collection_id: &str, batch: &ReorderBatch) -> BoxFuture<'_, Result<()>>;

    /// `POST /upload` (multipart)
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn upload(&self, dataset_id: &str, file: &UploadFile) -> BoxFuture<'_, Result<UploadReceipt>>;

    /// `GET /processing-status?dataset_id`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn processing_status(&self, dataset_id: &str) -> BoxFuture<'_, Result<ProcessingStatus>>;

    /// `GET /datasets`
    ///
    /// # Errors
    ///
    /// Returns transport, backend, or decode errors.
    fn list_datasets(&self) -> BoxFuture<'_, Result<DatasetList>>;
}
