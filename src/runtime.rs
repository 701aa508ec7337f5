//! Async runtime that drives a [`GallerySession`].
//!
//! The session itself never performs I/O. This module owns the event channel and
//! turns the [`Action`]s returned by [`handle_event`] into effects:
//!
//! ```text
//! Event ──► handle_event ──► Action::Call ──► spawned GalleryWorker call ──► Event::Api
//!                      ├───► Action::StartTimer ──► tokio sleep ──► Event::TimerFired
//!                      └───► Action::SavePreferences ──► PreferenceStore (inline)
//! ```
//!
//! Events are processed strictly one at a time; calls and timers run concurrently
//! and only ever talk back through the channel.

use crate::app::{handle_event, Action, Event, GallerySession};
use crate::storage::PreferenceStore;
use crate::worker::GalleryWorker;
use std::time::Instant;
use tokio::sync::mpsc;

/// Event loop state: the session, the worker that executes its calls and the
/// channel every effect reports back on.
///
/// Must be used from within a tokio runtime; calls and timers are spawned.
pub struct Runtime {
    session: GallerySession,
    worker: GalleryWorker,
    store: Option<PreferenceStore>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("worker", &self.worker)
            .field("store", &self.store.as_ref().map(PreferenceStore::path))
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Creates a runtime. Without a store, preference changes stay in memory.
    #[must_use]
    pub fn new(session: GallerySession, worker: GalleryWorker, store: Option<PreferenceStore>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            worker,
            store,
            events_tx,
            events_rx,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &GallerySession {
        &self.session
    }

    /// A sender for injecting events from outside the loop.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// Waits for the next event produced by a call, a timer or an external sender.
    ///
    /// Never returns `None` while the runtime is alive, since it holds a sender.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    /// Handles one event and executes the resulting actions.
    ///
    /// Returns `true` when the view should be re-rendered.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        match handle_event(&mut self.session, event) {
            Ok((should_render, actions)) => {
                tracing::debug!(
                    event = event.name(),
                    action_count = actions.len(),
                    should_render,
                    "event handled"
                );
                for action in actions {
                    self.execute(action);
                }
                should_render
            }
            Err(e) => {
                tracing::warn!(event = event.name(), error = %e, "error handling event");
                false
            }
        }
    }

    fn execute(&self, action: Action) {
        match action {
            Action::Call(request) => {
                tracing::debug!(operation = request.operation(), ticket_id = request.ticket().id, "spawning call");
                let worker = self.worker.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let response = worker.handle_message(request).await;
                    if tx.send(Event::Api(response)).is_err() {
                        tracing::debug!("event loop gone, reply dropped");
                    }
                });
            }
            Action::StartTimer { timer, token, after } => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let fired = Event::TimerFired {
                        timer,
                        token,
                        at: Instant::now(),
                    };
                    if tx.send(fired).is_err() {
                        tracing::debug!(timer = ?timer, "event loop gone, timer dropped");
                    }
                });
            }
            Action::SavePreferences(preferences) => {
                let Some(store) = &self.store else {
                    return;
                };
                if let Err(e) = store.save(&preferences) {
                    tracing::warn!(path = %store.path().display(), error = %e, "failed to save preferences");
                }
            }
        }
    }
}
