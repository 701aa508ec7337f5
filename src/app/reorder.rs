//! Optimistic reorder manager for collection view.
//!
//! Each reorder step moves the dragged item in the controller's list right away,
//! so the grid re-renders before anything goes over the network, and then sends
//! the complete new order to the backend. Steps are not coalesced; every
//! intermediate hover position is persisted, and since every batch carries the
//! full order, overlapping writes are harmless (last write wins).
//!
//! When a write fails the manager does not try to undo the move. It reloads the
//! collection from the backend, so client and server can never stay diverged.

use crate::app::controller::ImageSetController;
use crate::app::modes::Mode;
use crate::domain::ReorderBatch;
use crate::worker::{ApiRequest, ApiResult, Ticket};

#[derive(Debug, Clone, Default)]
pub struct ReorderManager {
    next_id: u64,
    in_flight: usize,
}

impl ReorderManager {
    /// Writes not yet answered by the backend.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies one reorder step and returns the persistence request.
    ///
    /// Returns `None` outside collection view and for steps the controller
    /// refuses (out of range, or onto the same slot).
    pub fn step(&mut self, controller: &mut ImageSetController, from: usize, to: usize) -> Option<ApiRequest> {
        if controller.mode() != Mode::CollectionView {
            return None;
        }
        let collection_id = controller.active_collection_id()?.to_string();
        if !controller.move_item(from, to) {
            return None;
        }

        let batch = ReorderBatch::from_items(controller.items());
        self.next_id += 1;
        self.in_flight += 1;
        tracing::debug!(
            collection_id = %collection_id,
            from,
            to,
            entries = batch.len(),
            "reorder step applied"
        );

        Some(ApiRequest::persist_order(
            Ticket::new(self.next_id, controller.epoch()),
            collection_id,
            batch,
        ))
    }

    /// Handles a persistence reply. On failure, returns the reload that restores
    /// the authoritative order if the collection is still being viewed.
    pub fn on_persisted(
        &mut self,
        controller: &mut ImageSetController,
        collection_id: &str,
        result: &ApiResult<()>,
    ) -> Option<ApiRequest> {
        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            Ok(()) => {
                tracing::debug!(collection_id, "order persisted");
                None
            }
            Err(failure) if controller.is_viewing_collection(collection_id) => {
                tracing::warn!(collection_id, error = %failure, "order not persisted, reloading collection");
                controller.refresh()
            }
            Err(failure) => {
                tracing::warn!(collection_id, error = %failure, "order not persisted for inactive collection");
                None
            }
        }
    }
}
