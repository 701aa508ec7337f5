//! Worker that executes backend requests on behalf of the session.
//!
//! The session stays synchronous and free of I/O. Every [`ApiRequest`] it emits is
//! executed here against a [`Backend`] and turned into exactly one
//! [`ApiResponse`], which the runtime feeds back into the event loop. Failures are
//! converted into [`ApiFailure`](super::ApiFailure)s so they can travel with the
//! reply instead of aborting anything.

use crate::domain::error::Result;
use crate::storage::backend::Backend;
use crate::worker::messages::{ApiResult, CollectionOp};
use crate::worker::{ApiRequest, ApiResponse};
use std::sync::Arc;
use tracing::Instrument;

/// Executes [`ApiRequest`]s against a shared backend.
///
/// Cheap to clone; the runtime hands a clone to every spawned call.
#[derive(Clone)]
pub struct GalleryWorker {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for GalleryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryWorker").finish_non_exhaustive()
    }
}

impl GalleryWorker {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Converts a backend result into a reply payload with consistent logging.
    fn handle_result<T>(operation: &str, result: Result<T>) -> ApiResult<T> {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "backend call successful");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "backend call failed");
                Err(e.into())
            }
        }
    }

    /// Executes one request and returns its reply.
    ///
    /// Never fails: backend errors are carried inside the response.
    pub async fn handle_message(&self, request: ApiRequest) -> ApiResponse {
        let ticket = request.ticket();
        let span = tracing::debug_span!(
            "worker_handle_message",
            operation = request.operation(),
            ticket_id = ticket.id
        );
        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: ApiRequest) -> ApiResponse {
        let ticket = request.ticket();
        let operation = request.operation();

        match request {
            ApiRequest::ListImages {
                dataset_id,
                page,
                per_page,
                ..
            } => ApiResponse::PageLoaded {
                ticket,
                result: Self::handle_result(
                    operation,
                    self.backend.list_images(&dataset_id, page, per_page).await,
                ),
            },

            ApiRequest::CollectionMembers { collection_id, .. } => ApiResponse::MembersLoaded {
                ticket,
                result: Self::handle_result(
                    operation,
                    self.backend.collection_members(&collection_id).await,
                ),
            },

            ApiRequest::Search { request, .. } => ApiResponse::SearchCompleted {
                ticket,
                result: Self::handle_result(operation, self.backend.search(&request).await),
            },

            ApiRequest::ListCollections { .. } => ApiResponse::CollectionsListed {
                ticket,
                result: Self::handle_result(operation, self.backend.list_collections().await),
            },

            ApiRequest::CreateCollection { name, .. } => ApiResponse::CollectionCreated {
                ticket,
                result: Self::handle_result(operation, self.backend.create_collection(&name).await),
            },

            ApiRequest::RenameCollection {
                collection_id, name, ..
            } => {
                let result = self.backend.rename_collection(&collection_id, &name).await;
                ApiResponse::CollectionChanged {
                    ticket,
                    op: CollectionOp::Renamed { collection_id },
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::DeleteCollection { collection_id, .. } => {
                let result = self.backend.delete_collection(&collection_id).await;
                ApiResponse::CollectionChanged {
                    ticket,
                    op: CollectionOp::Deleted { collection_id },
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::AddToCollection {
                collection_id,
                image_paths,
                ..
            } => {
                let result = self.backend.add_to_collection(&collection_id, &image_paths).await;
                ApiResponse::CollectionChanged {
                    ticket,
                    op: CollectionOp::ImagesAdded { collection_id },
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::RemoveFromCollection {
                collection_id,
                image_paths,
                ..
            } => {
                let result = self
                    .backend
                    .remove_from_collection(&collection_id, &image_paths)
                    .await;
                ApiResponse::CollectionChanged {
                    ticket,
                    op: CollectionOp::ImagesRemoved { collection_id },
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::PersistOrder {
                collection_id,
                batch,
                ..
            } => {
                let result = self.backend.persist_order(&collection_id, &batch).await;
                ApiResponse::OrderPersisted {
                    ticket,
                    collection_id,
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::Upload { dataset_id, file, .. } => ApiResponse::Uploaded {
                ticket,
                result: Self::handle_result(operation, self.backend.upload(&dataset_id, &file).await),
            },

            ApiRequest::ProcessingStatus { dataset_id, .. } => {
                let result = self.backend.processing_status(&dataset_id).await;
                ApiResponse::StatusPolled {
                    ticket,
                    dataset_id,
                    result: Self::handle_result(operation, result),
                }
            }

            ApiRequest::ListDatasets { .. } => ApiResponse::DatasetsListed {
                ticket,
                result: Self::handle_result(operation, self.backend.list_datasets().await),
            },
        }
    }
}
