//! Shared fixtures for integration tests: a scripted, recording backend and a
//! deterministic harness that executes actions by hand.

#![allow(dead_code)]

use futures_util::future::{self, BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tapestry_client::app::{Action, Event, GallerySession, TimerKind};
use tapestry_client::domain::{Collection, Dataset, ProcessingStatus, ReorderBatch};
use tapestry_client::storage::{
    Backend, CollectionList, CollectionMember, CollectionMembers, DatasetList, ImagePage,
    Preferences, SearchRequest, SearchResults, UploadFile, UploadReceipt, WireImage,
};
use tapestry_client::worker::{ApiRequest, GalleryWorker};
use tapestry_client::{handle_event, Config, GalleryError, Result};

/// A backend call as observed by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListImages { dataset_id: String, page: u32 },
    CollectionMembers(String),
    Search(SearchRequest),
    ListCollections,
    CreateCollection(String),
    RenameCollection { collection_id: String, name: String },
    DeleteCollection(String),
    AddToCollection { collection_id: String, image_paths: Vec<String> },
    RemoveFromCollection { collection_id: String, image_paths: Vec<String> },
    PersistOrder { collection_id: String, batch: ReorderBatch },
    Upload { dataset_id: String, name: String },
    ProcessingStatus(String),
    ListDatasets,
}

/// In-memory backend with scripted data. Every call is recorded.
///
/// Collection members are stored in order and `persist_order` rewrites that
/// order, so a reload after a successful persist returns the persisted order.
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    datasets: Mutex<Vec<Dataset>>,
    collections: Mutex<Vec<Collection>>,
    pages: Mutex<HashMap<(String, u32), ImagePage>>,
    members: Mutex<HashMap<String, Vec<String>>>,
    searches: Mutex<HashMap<String, Vec<String>>>,
    statuses: Mutex<HashMap<String, ProcessingStatus>>,
}

fn ready<T: Send + 'static>(result: Result<T>) -> BoxFuture<'static, Result<T>> {
    future::ready(result).boxed()
}

fn names(names: &[&str]) -> Vec<WireImage> {
    names.iter().map(|n| WireImage::Name((*n).to_string())).collect()
}

impl MockBackend {
    pub fn with_dataset(self, id: &str) -> Self {
        self.datasets.lock().unwrap().push(Dataset {
            id: id.to_string(),
            name: id.to_uppercase(),
        });
        self
    }

    pub fn with_page(self, dataset_id: &str, page: u32, images: &[&str], has_more: bool) -> Self {
        self.pages.lock().unwrap().insert(
            (dataset_id.to_string(), page),
            ImagePage {
                images: names(images),
                total: None,
                has_more: Some(has_more),
                processing_status: None,
            },
        );
        self
    }

    pub fn with_collection(self, id: &str, members: &[&str]) -> Self {
        self.collections.lock().unwrap().push(Collection {
            id: id.to_string(),
            name: format!("Collection {id}"),
        });
        self.members
            .lock()
            .unwrap()
            .insert(id.to_string(), members.iter().map(|m| (*m).to_string()).collect());
        self
    }

    /// Results for a text query or an image reference.
    pub fn with_search(self, key: &str, results: &[&str]) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert(key.to_string(), results.iter().map(|r| (*r).to_string()).collect());
        self
    }

    pub fn with_status(self, dataset_id: &str, status: ProcessingStatus) -> Self {
        self.statuses.lock().unwrap().insert(dataset_id.to_string(), status);
        self
    }

    /// Makes every later call of `operation` fail with a 500.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn members_of(&self, collection_id: &str) -> Vec<String> {
        self.members
            .lock()
            .unwrap()
            .get(collection_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(GalleryError::Backend {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn list_images(&self, dataset_id: &str, page: u32, _per_page: u32) -> BoxFuture<'_, Result<ImagePage>> {
        let call = Call::ListImages {
            dataset_id: dataset_id.to_string(),
            page,
        };
        let result = self.record("list_images", call).map(|()| {
            self.pages
                .lock()
                .unwrap()
                .get(&(dataset_id.to_string(), page))
                .cloned()
                .unwrap_or_default()
        });
        ready(result)
    }

    fn collection_members(&self, collection_id: &str) -> BoxFuture<'_, Result<CollectionMembers>> {
        let result = self
            .record("collection_members", Call::CollectionMembers(collection_id.to_string()))
            .map(|()| CollectionMembers {
                images: self
                    .members_of(collection_id)
                    .into_iter()
                    .enumerate()
                    .map(|(position, path)| CollectionMember {
                        path,
                        position: Some(position),
                        prompt: None,
                    })
                    .collect(),
            });
        ready(result)
    }

    fn search(&self, request: &SearchRequest) -> BoxFuture<'_, Result<SearchResults>> {
        let key = request
            .query
            .clone()
            .or_else(|| request.image.clone())
            .unwrap_or_default();
        let result = self.record("search", Call::Search(request.clone())).map(|()| {
            let hits = self.searches.lock().unwrap().get(&key).cloned().unwrap_or_default();
            SearchResults {
                total: Some(hits.len()),
                results: hits.into_iter().map(WireImage::Name).collect(),
            }
        });
        ready(result)
    }

    fn list_collections(&self) -> BoxFuture<'_, Result<CollectionList>> {
        let result = self.record("list_collections", Call::ListCollections).map(|()| CollectionList {
            collections: self.collections.lock().unwrap().clone(),
        });
        ready(result)
    }

    fn create_collection(&self, name: &str) -> BoxFuture<'_, Result<Collection>> {
        let result = self
            .record("create_collection", Call::CreateCollection(name.to_string()))
            .map(|()| {
                let mut collections = self.collections.lock().unwrap();
                let collection = Collection {
                    id: format!("c{}", collections.len() + 1),
                    name: name.to_string(),
                };
                collections.push(collection.clone());
                collection
            });
        ready(result)
    }

    fn rename_collection(&self, collection_id: &str, name: &str) -> BoxFuture<'_, Result<()>> {
        let call = Call::RenameCollection {
            collection_id: collection_id.to_string(),
            name: name.to_string(),
        };
        let result = self.record("rename_collection", call).map(|()| {
            for collection in self.collections.lock().unwrap().iter_mut() {
                if collection.id == collection_id {
                    collection.name = name.to_string();
                }
            }
        });
        ready(result)
    }

    fn delete_collection(&self, collection_id: &str) -> BoxFuture<'_, Result<()>> {
        let result = self
            .record("delete_collection", Call::DeleteCollection(collection_id.to_string()))
            .map(|()| {
                self.collections.lock().unwrap().retain(|c| c.id != collection_id);
                self.members.lock().unwrap().remove(collection_id);
            });
        ready(result)
    }

    fn add_to_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>> {
        let call = Call::AddToCollection {
            collection_id: collection_id.to_string(),
            image_paths: image_paths.to_vec(),
        };
        let result = self.record("add_to_collection", call).map(|()| {
            let mut members = self.members.lock().unwrap();
            let entry = members.entry(collection_id.to_string()).or_default();
            for path in image_paths {
                if !entry.contains(path) {
                    entry.push(path.clone());
                }
            }
        });
        ready(result)
    }

    fn remove_from_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>> {
        let call = Call::RemoveFromCollection {
            collection_id: collection_id.to_string(),
            image_paths: image_paths.to_vec(),
        };
        let result = self.record("remove_from_collection", call).map(|()| {
            if let Some(entry) = self.members.lock().unwrap().get_mut(collection_id) {
                entry.retain(|path| !image_paths.contains(path));
            }
        });
        ready(result)
    }

    fn persist_order(&self, collection_id: &str, batch: &ReorderBatch) -> BoxFuture<'_, Result<()>> {
        let call = Call::PersistOrder {
            collection_id: collection_id.to_string(),
            batch: batch.clone(),
        };
        let result = self.record("persist_order", call).map(|()| {
            let mut ordered = batch.positions.clone();
            ordered.sort_by_key(|entry| entry.position);
            self.members.lock().unwrap().insert(
                collection_id.to_string(),
                ordered.into_iter().map(|entry| entry.path).collect(),
            );
        });
        ready(result)
    }

    fn upload(&self, dataset_id: &str, file: &UploadFile) -> BoxFuture<'_, Result<UploadReceipt>> {
        let call = Call::Upload {
            dataset_id: dataset_id.to_string(),
            name: file.name.clone(),
        };
        let result = self.record("upload", call).map(|()| UploadReceipt {
            success: true,
            filename: Some(format!("uploads/{}", file.name)),
            error: None,
        });
        ready(result)
    }

    fn processing_status(&self, dataset_id: &str) -> BoxFuture<'_, Result<ProcessingStatus>> {
        let result = self
            .record("processing_status", Call::ProcessingStatus(dataset_id.to_string()))
            .map(|()| self.statuses.lock().unwrap().get(dataset_id).copied().unwrap_or_default());
        ready(result)
    }

    fn list_datasets(&self) -> BoxFuture<'_, Result<DatasetList>> {
        let result = self.record("list_datasets", Call::ListDatasets).map(|()| DatasetList {
            datasets: self.datasets.lock().unwrap().clone(),
        });
        ready(result)
    }
}

/// A timer requested by the session and not yet fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub timer: TimerKind,
    pub token: u64,
    pub after: Duration,
}

/// Drives a session by hand: calls queue up until a test executes them, and
/// timers fire only when a test fires them.
pub struct Harness {
    pub session: GallerySession,
    pub backend: Arc<MockBackend>,
    worker: GalleryWorker,
    pub calls: VecDeque<ApiRequest>,
    pub timers: Vec<PendingTimer>,
    pub saved: Vec<Preferences>,
}

impl Harness {
    pub fn new(backend: MockBackend) -> Self {
        let config = Config {
            dataset_id: Some("ds".to_string()),
            page_size: 3,
            ..Config::default()
        };
        Self::with_config(backend, &config)
    }

    pub fn with_config(backend: MockBackend, config: &Config) -> Self {
        let backend = Arc::new(backend);
        Self {
            session: GallerySession::new(config, Preferences::default()),
            worker: GalleryWorker::new(backend.clone()),
            backend,
            calls: VecDeque::new(),
            timers: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Handles one event and queues the resulting actions. Returns the render flag.
    pub fn send(&mut self, event: Event) -> bool {
        let (render, actions) = handle_event(&mut self.session, &event).unwrap();
        for action in actions {
            match action {
                Action::Call(request) => self.calls.push_back(request),
                Action::StartTimer { timer, token, after } => {
                    self.timers.push(PendingTimer { timer, token, after });
                }
                Action::SavePreferences(preferences) => self.saved.push(preferences),
            }
        }
        render
    }

    /// Removes and returns every queued call, oldest first.
    pub fn take_calls(&mut self) -> Vec<ApiRequest> {
        self.calls.drain(..).collect()
    }

    /// Executes one request against the backend and feeds the reply back.
    pub async fn reply(&mut self, request: ApiRequest) -> bool {
        let response = self.worker.handle_message(request).await;
        self.send(Event::Api(response))
    }

    /// Executes queued calls in order until none are left.
    pub async fn settle(&mut self) {
        while let Some(request) = self.calls.pop_front() {
            self.reply(request).await;
        }
    }

    /// Fires every pending timer of `kind`, oldest first.
    pub fn fire(&mut self, kind: TimerKind) {
        self.fire_at(kind, Instant::now());
    }

    pub fn fire_at(&mut self, kind: TimerKind, at: Instant) {
        let (due, rest): (Vec<_>, Vec<_>) = self.timers.drain(..).partition(|t| t.timer == kind);
        self.timers = rest;
        for timer in due {
            self.send(Event::TimerFired {
                timer: timer.timer,
                token: timer.token,
                at,
            });
        }
    }

    /// Runs startup to completion.
    pub async fn start(&mut self) {
        self.send(Event::Init);
        self.settle().await;
    }

    /// Types `text` into the search box and lets the debounce expire.
    pub async fn search(&mut self, text: &str) {
        self.send(Event::SearchInput(text.to_string()));
        self.fire(TimerKind::Debounce);
        self.settle().await;
    }

    pub fn identities(&self) -> Vec<String> {
        self.session
            .controller
            .items()
            .iter()
            .map(|item| item.identity.clone())
            .collect()
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}
