//! Actions representing side effects to be executed by the runtime.
//!
//! This module defines the [`Action`] type, which represents imperative commands
//! produced by the event handler after processing user input, timer expiries, or
//! backend replies. Actions are the boundary between the pure session state
//! machine and effectful work: network calls, timers, and preference writes.
//!
//! # Architecture
//!
//! The event handler returns a `Vec<Action>` after processing each event, allowing
//! multiple side effects to be queued atomically. The runtime executes them in
//! order; calls and timers run concurrently and report back as new events.
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::{Action, TimerKind};
//! use std::time::Duration;
//!
//! let actions = vec![Action::StartTimer {
//!     timer: TimerKind::Debounce,
//!     token: 1,
//!     after: Duration::from_millis(300),
//! }];
//! assert_eq!(actions.len(), 1);
//! ```

use crate::storage::Preferences;
use crate::worker::ApiRequest;
use std::time::Duration;

/// Which per-instance timer a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Search box quiet period.
    Debounce,
    /// Trailing scroll check.
    Scroll,
    /// Next processing status poll.
    Poll,
}

/// Commands representing side effects to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Executes a backend request; its reply comes back as
    /// [`Event::Api`](crate::app::Event::Api).
    Call(ApiRequest),

    /// Fires [`Event::TimerFired`](crate::app::Event::TimerFired) with the same
    /// timer and token after `after`.
    ///
    /// Timers are never cancelled; the owning component ignores tokens it has
    /// superseded.
    StartTimer {
        timer: TimerKind,
        token: u64,
        after: Duration,
    },

    /// Writes the preferences to disk.
    SavePreferences(Preferences),
}
