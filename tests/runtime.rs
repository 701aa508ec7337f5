mod common;

use common::{Call, MockBackend};
use std::sync::Arc;
use tapestry_client::app::{Event, GallerySession, Mode};
use tapestry_client::runtime::Runtime;
use tapestry_client::storage::{PreferenceStore, Preferences};
use tapestry_client::worker::GalleryWorker;
use tapestry_client::Config;

fn runtime(backend: Arc<MockBackend>, store: Option<PreferenceStore>) -> Runtime {
    let config = Config {
        dataset_id: Some("ds".to_string()),
        ..Config::default()
    };
    let session = GallerySession::new(&config, Preferences::default());
    Runtime::new(session, GalleryWorker::new(backend), store)
}

/// Processes `count` events produced by spawned calls and timers.
async fn pump(runtime: &mut Runtime, count: usize) {
    for _ in 0..count {
        let event = runtime.next_event().await.unwrap();
        runtime.dispatch(&event);
    }
}

#[tokio::test(start_paused = true)]
async fn debounced_search_runs_through_spawned_timer_and_call() {
    let backend = Arc::new(
        MockBackend::default()
            .with_dataset("ds")
            .with_page("ds", 1, &["a.jpg", "b.jpg"], false)
            .with_search("dog", &["b.jpg"]),
    );
    let mut runtime = runtime(backend.clone(), None);

    assert!(runtime.dispatch(&Event::Init));
    pump(&mut runtime, 4).await;
    assert_eq!(runtime.session().controller.items().len(), 2);

    runtime.dispatch(&Event::SearchInput("dog".to_string()));
    let fired = runtime.next_event().await.unwrap();
    assert!(matches!(fired, Event::TimerFired { .. }));
    runtime.dispatch(&fired);
    pump(&mut runtime, 1).await;

    assert_eq!(runtime.session().controller.mode(), Mode::Searching);
    assert_eq!(runtime.session().controller.items()[0].identity, "b.jpg");
    assert_eq!(
        backend.calls().iter().filter(|c| matches!(c, Call::Search(_))).count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn timer_firing_after_shutdown_is_dropped_quietly() {
    let mut runtime = runtime(Arc::new(MockBackend::default()), None);
    runtime.dispatch(&Event::SearchInput("dog".to_string()));
    let sender = runtime.sender();
    drop(runtime);

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    assert!(sender.is_closed());
}

#[tokio::test]
async fn grid_column_change_is_written_to_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::new(dir.path().join("preferences.json")).unwrap();
    let mut runtime = runtime(Arc::new(MockBackend::default()), Some(store));

    runtime.dispatch(&Event::SetGridColumns {
        requested: 7,
        container_width: 1600,
    });

    let reloaded = PreferenceStore::new(dir.path().join("preferences.json"))
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(reloaded.grid_columns, 7);
    assert!(reloaded.updated_at.is_some());
}
