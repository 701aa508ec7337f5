//! Request and response protocol between the session and the backend worker.
//!
//! The session never talks to the backend directly. It emits [`ApiRequest`]s as
//! actions; the runtime hands them to the [`GalleryWorker`](super::GalleryWorker),
//! and the worker answers with exactly one [`ApiResponse`] per request.
//!
//! Every request carries a [`Ticket`]. The worker echoes it back untouched, which
//! is how the session recognizes replies that arrive after the context that issued
//! them has moved on.

use crate::domain::error::GalleryError;
use crate::domain::{Collection, ProcessingStatus, ReorderBatch};
use crate::storage::models::{
    CollectionList, CollectionMembers, DatasetList, ImagePage, SearchRequest, SearchResults,
    UploadFile, UploadReceipt,
};
use serde::{Deserialize, Serialize};

/// Identifies one backend request and the context it was issued in.
///
/// `generation` is the issuing component's context generation at issue time (the
/// controller's epoch, or the poller's generation). A reply whose generation is no
/// longer current is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub generation: u64,
}

impl Ticket {
    #[must_use]
    pub const fn new(id: u64, generation: u64) -> Self {
        Self { id, generation }
    }
}

/// Category of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The request never produced a response.
    Transport,
    /// The backend reported an application error.
    Backend { status: u16 },
    /// The response body did not match the expected shape.
    Decode,
    Other,
}

/// A backend failure as carried inside an [`ApiResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&GalleryError> for ApiFailure {
    fn from(error: &GalleryError) -> Self {
        let kind = match error {
            GalleryError::Transport(_) => FailureKind::Transport,
            GalleryError::Backend { status, .. } => FailureKind::Backend { status: *status },
            GalleryError::Decode(_) => FailureKind::Decode,
            _ => FailureKind::Other,
        };
        let message = match error {
            GalleryError::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self { kind, message }
    }
}

impl From<GalleryError> for ApiFailure {
    fn from(error: GalleryError) -> Self {
        Self::from(&error)
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a backend call as seen by the session.
pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// Macro to generate builder methods for `ApiRequest` variants.
///
/// Every builder takes the ticket first, followed by the variant's fields in order.
macro_rules! api_request_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl ApiRequest {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " request")]
                #[must_use]
                pub fn $builder_name(ticket: Ticket, $($field: $ty),*) -> Self {
                    Self::$variant {
                        ticket,
                        $($field,)*
                    }
                }
            )*
        }
    };
}

api_request_builders! {
    list_images(ListImages { dataset_id: String, page: u32, per_page: u32 }),
    collection_members(CollectionMembers { collection_id: String }),
    search(Search { request: SearchRequest }),
    list_collections(ListCollections {}),
    create_collection(CreateCollection { name: String }),
    rename_collection(RenameCollection { collection_id: String, name: String }),
    delete_collection(DeleteCollection { collection_id: String }),
    add_to_collection(AddToCollection { collection_id: String, image_paths: Vec<String> }),
    remove_from_collection(RemoveFromCollection { collection_id: String, image_paths: Vec<String> }),
    persist_order(PersistOrder { collection_id: String, batch: ReorderBatch }),
    upload(Upload { dataset_id: String, file: UploadFile }),
    processing_status(ProcessingStatus { dataset_id: String }),
    list_datasets(ListDatasets {}),
}

/// Backend operations requested by the session.
///
/// One variant per REST operation of the gallery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiRequest {
    /// One page of the dataset's plain listing.
    ListImages {
        ticket: Ticket,
        dataset_id: String,
        page: u32,
        per_page: u32,
    },

    /// All members of a collection.
    CollectionMembers { ticket: Ticket, collection_id: String },

    /// Text or image-similarity search.
    Search { ticket: Ticket, request: SearchRequest },

    ListCollections { ticket: Ticket },

    CreateCollection { ticket: Ticket, name: String },

    RenameCollection {
        ticket: Ticket,
        collection_id: String,
        name: String,
    },

    DeleteCollection { ticket: Ticket, collection_id: String },

    AddToCollection {
        ticket: Ticket,
        collection_id: String,
        image_paths: Vec<String>,
    },

    RemoveFromCollection {
        ticket: Ticket,
        collection_id: String,
        image_paths: Vec<String>,
    },

    /// Full position assignment for a collection.
    PersistOrder {
        ticket: Ticket,
        collection_id: String,
        batch: ReorderBatch,
    },

    Upload {
        ticket: Ticket,
        dataset_id: String,
        file: UploadFile,
    },

    ProcessingStatus { ticket: Ticket, dataset_id: String },

    ListDatasets { ticket: Ticket },
}

impl ApiRequest {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::ListImages { ticket, .. }
            | Self::CollectionMembers { ticket, .. }
            | Self::Search { ticket, .. }
            | Self::ListCollections { ticket }
            | Self::CreateCollection { ticket, .. }
            | Self::RenameCollection { ticket, .. }
            | Self::DeleteCollection { ticket, .. }
            | Self::AddToCollection { ticket, .. }
            | Self::RemoveFromCollection { ticket, .. }
            | Self::PersistOrder { ticket, .. }
            | Self::Upload { ticket, .. }
            | Self::ProcessingStatus { ticket, .. }
            | Self::ListDatasets { ticket } => *ticket,
        }
    }

    /// Short operation name for logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::ListImages { .. } => "list images",
            Self::CollectionMembers { .. } => "collection members",
            Self::Search { .. } => "search",
            Self::ListCollections { .. } => "list collections",
            Self::CreateCollection { .. } => "create collection",
            Self::RenameCollection { .. } => "rename collection",
            Self::DeleteCollection { .. } => "delete collection",
            Self::AddToCollection { .. } => "add to collection",
            Self::RemoveFromCollection { .. } => "remove from collection",
            Self::PersistOrder { .. } => "persist order",
            Self::Upload { .. } => "upload",
            Self::ProcessingStatus { .. } => "processing status",
            Self::ListDatasets { .. } => "list datasets",
        }
    }
}

/// Collection mutation whose reply carries no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionOp {
    Renamed { collection_id: String },
    Deleted { collection_id: String },
    ImagesAdded { collection_id: String },
    ImagesRemoved { collection_id: String },
}

impl CollectionOp {
    #[must_use]
    pub fn collection_id(&self) -> &str {
        match self {
            Self::Renamed { collection_id }
            | Self::Deleted { collection_id }
            | Self::ImagesAdded { collection_id }
            | Self::ImagesRemoved { collection_id } => collection_id,
        }
    }
}

/// Replies sent from the worker back to the session.
///
/// Each variant answers one [`ApiRequest`] and echoes its ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiResponse {
    PageLoaded {
        ticket: Ticket,
        result: ApiResult<ImagePage>,
    },

    MembersLoaded {
        ticket: Ticket,
        result: ApiResult<CollectionMembers>,
    },

    SearchCompleted {
        ticket: Ticket,
        result: ApiResult<SearchResults>,
    },

    CollectionsListed {
        ticket: Ticket,
        result: ApiResult<CollectionList>,
    },

    CollectionCreated {
        ticket: Ticket,
        result: ApiResult<Collection>,
    },

    /// Rename, delete, or membership change finished.
    CollectionChanged {
        ticket: Ticket,
        op: CollectionOp,
        result: ApiResult<()>,
    },

    OrderPersisted {
        ticket: Ticket,
        collection_id: String,
        result: ApiResult<()>,
    },

    Uploaded {
        ticket: Ticket,
        result: ApiResult<UploadReceipt>,
    },

    StatusPolled {
        ticket: Ticket,
        dataset_id: String,
        result: ApiResult<ProcessingStatus>,
    },

    DatasetsListed {
        ticket: Ticket,
        result: ApiResult<DatasetList>,
    },
}

impl ApiResponse {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::PageLoaded { ticket, .. }
            | Self::MembersLoaded { ticket, .. }
            | Self::SearchCompleted { ticket, .. }
            | Self::CollectionsListed { ticket, .. }
            | Self::CollectionCreated { ticket, .. }
            | Self::CollectionChanged { ticket, .. }
            | Self::OrderPersisted { ticket, .. }
            | Self::Uploaded { ticket, .. }
            | Self::StatusPolled { ticket, .. }
            | Self::DatasetsListed { ticket, .. } => *ticket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_attach_ticket() {
        let ticket = Ticket::new(7, 2);
        let request = ApiRequest::add_to_collection(ticket, "c1".to_string(), vec!["x.jpg".to_string()]);

        assert_eq!(request.ticket(), ticket);
        assert_eq!(request.operation(), "add to collection");
        assert!(matches!(
            request,
            ApiRequest::AddToCollection { ref collection_id, ref image_paths, .. }
                if collection_id == "c1" && image_paths == &["x.jpg".to_string()]
        ));
    }

    #[test]
    fn failures_keep_backend_status() {
        let error = GalleryError::Backend {
            status: 404,
            message: "Collection not found.".to_string(),
        };
        let failure = ApiFailure::from(&error);

        assert_eq!(failure.kind, FailureKind::Backend { status: 404 });
        assert_eq!(failure.to_string(), "Collection not found.");

        let failure = ApiFailure::from(GalleryError::InvalidState("nope".to_string()));
        assert_eq!(failure.kind, FailureKind::Other);
    }
}
