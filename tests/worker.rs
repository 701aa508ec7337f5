mod common;

use common::MockBackend;
use std::sync::Arc;
use tapestry_client::domain::ReorderBatch;
use tapestry_client::worker::{
    ApiRequest, ApiResponse, CollectionOp, FailureKind, GalleryWorker, Ticket,
};

fn worker(backend: MockBackend) -> (Arc<MockBackend>, GalleryWorker) {
    let backend = Arc::new(backend);
    (backend.clone(), GalleryWorker::new(backend))
}

#[tokio::test]
async fn reply_echoes_ticket_and_payload() {
    let (_, worker) = worker(MockBackend::default().with_page("ds", 2, &["a.jpg"], true));
    let ticket = Ticket::new(7, 3);

    let response = worker
        .handle_message(ApiRequest::list_images(ticket, "ds".to_string(), 2, 50))
        .await;

    assert_eq!(response.ticket(), ticket);
    let ApiResponse::PageLoaded { result: Ok(page), .. } = &response else {
        panic!("expected a loaded page, got {response:?}");
    };
    assert_eq!(page.images.len(), 1);
    assert_eq!(page.has_more, Some(true));
}

#[tokio::test]
async fn backend_error_travels_inside_reply() {
    let (backend, worker) = worker(MockBackend::default().with_collection("c1", &["a.jpg"]));
    backend.fail("persist_order");

    let response = worker
        .handle_message(ApiRequest::persist_order(
            Ticket::new(1, 0),
            "c1".to_string(),
            ReorderBatch::default(),
        ))
        .await;

    let ApiResponse::OrderPersisted {
        collection_id,
        result: Err(failure),
        ..
    } = &response
    else {
        panic!("expected a failed persist, got {response:?}");
    };
    assert_eq!(collection_id, "c1");
    assert_eq!(failure.kind, FailureKind::Backend { status: 500 });
    assert_eq!(failure.message, "persist_order failed");
    assert_eq!(backend.members_of("c1"), vec!["a.jpg"]);
}

#[tokio::test]
async fn collection_changes_report_their_operation() {
    let (backend, worker) = worker(MockBackend::default().with_collection("c1", &[]));

    let response = worker
        .handle_message(ApiRequest::add_to_collection(
            Ticket::new(2, 0),
            "c1".to_string(),
            vec!["b.jpg".to_string()],
        ))
        .await;

    assert!(matches!(
        response,
        ApiResponse::CollectionChanged {
            op: CollectionOp::ImagesAdded { ref collection_id },
            result: Ok(()),
            ..
        } if collection_id == "c1"
    ));
    assert_eq!(backend.members_of("c1"), vec!["b.jpg"]);
}
