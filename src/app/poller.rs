//! Background processing status poller.
//!
//! The backend indexes new images asynchronously. While it reports work in
//! progress the poller asks again after a fixed interval; the first reply saying
//! the work is done (or any failure) stops it. There is no backoff and no cap.
//!
//! Requests and timers carry the poller's generation. Starting the poller for a
//! new dataset advances the generation, so replies and timers that belong to the
//! previous dataset are discarded when they arrive.

use crate::domain::ProcessingStatus;
use crate::worker::{ApiRequest, ApiResult, Ticket};
use std::time::Duration;

/// What the caller should do after a status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reply belonged to an older generation or dataset.
    Discarded,
    /// The status changed; schedule the next poll with this timer token.
    Continue { token: u64, after: Duration },
    /// Polling has stopped.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct StatusPoller {
    interval: Duration,
    dataset_id: Option<String>,
    generation: u64,
    next_id: u64,
    status: Option<ProcessingStatus>,
}

impl StatusPoller {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            dataset_id: None,
            generation: 0,
            next_id: 0,
            status: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<ProcessingStatus> {
        self.status
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Restarts polling for `dataset_id` and returns the first request.
    pub fn start(&mut self, dataset_id: &str) -> ApiRequest {
        self.generation += 1;
        self.dataset_id = Some(dataset_id.to_string());
        self.status = None;
        tracing::debug!(dataset_id, generation = self.generation, "status poller started");
        self.request()
    }

    fn request(&mut self) -> ApiRequest {
        self.next_id += 1;
        let dataset_id = self.dataset_id.clone().unwrap_or_default();
        ApiRequest::processing_status(Ticket::new(self.next_id, self.generation), dataset_id)
    }

    /// Handles a status reply.
    pub fn on_status(
        &mut self,
        ticket: Ticket,
        dataset_id: &str,
        result: &ApiResult<ProcessingStatus>,
    ) -> PollOutcome {
        if ticket.generation != self.generation || self.dataset_id.as_deref() != Some(dataset_id) {
            tracing::debug!(
                dataset_id,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale status reply"
            );
            return PollOutcome::Discarded;
        }

        match result {
            Ok(status) => {
                self.status = Some(*status);
                if status.is_processing {
                    PollOutcome::Continue {
                        token: self.generation,
                        after: self.interval,
                    }
                } else {
                    tracing::debug!(dataset_id, "processing finished, poller stopped");
                    PollOutcome::Stopped
                }
            }
            Err(failure) => {
                tracing::warn!(dataset_id, error = %failure, "status poll failed, poller stopped");
                PollOutcome::Stopped
            }
        }
    }

    /// Handles the interval timer. Returns the next request unless the timer is
    /// from an older generation.
    pub fn on_timer(&mut self, token: u64) -> Option<ApiRequest> {
        if token != self.generation || self.dataset_id.is_none() {
            return None;
        }
        Some(self.request())
    }

    /// Records a status that arrived with a listing page.
    pub fn show(&mut self, status: ProcessingStatus) {
        self.status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{ApiFailure, FailureKind};

    fn busy() -> ProcessingStatus {
        ProcessingStatus {
            is_processing: true,
            processed_count: 3,
            total_count: 10,
        }
    }

    #[test]
    fn keeps_polling_while_processing() {
        let mut poller = StatusPoller::new(Duration::from_millis(2000));
        let request = poller.start("ds1");

        let outcome = poller.on_status(request.ticket(), "ds1", &Ok(busy()));
        let PollOutcome::Continue { token, after } = outcome else {
            panic!("expected polling to continue, got {outcome:?}");
        };
        assert_eq!(after, Duration::from_millis(2000));

        let next = poller.on_timer(token).unwrap();
        let done = ProcessingStatus::default();
        assert_eq!(poller.on_status(next.ticket(), "ds1", &Ok(done)), PollOutcome::Stopped);
        assert_eq!(poller.status(), Some(done));
    }

    #[test]
    fn dataset_switch_discards_old_replies_and_timers() {
        let mut poller = StatusPoller::new(Duration::from_millis(2000));
        let old = poller.start("ds1");
        let old_timer = poller.generation();
        let _ = poller.start("ds2");

        assert_eq!(poller.on_status(old.ticket(), "ds1", &Ok(busy())), PollOutcome::Discarded);
        assert!(poller.status().is_none());
        assert!(poller.on_timer(old_timer).is_none());
    }

    #[test]
    fn failure_stops_polling() {
        let mut poller = StatusPoller::new(Duration::from_millis(2000));
        let request = poller.start("ds1");
        let failure = ApiFailure::new(FailureKind::Transport, "connection refused");

        assert_eq!(
            poller.on_status(request.ticket(), "ds1", &Err(failure)),
            PollOutcome::Stopped
        );
    }
}
