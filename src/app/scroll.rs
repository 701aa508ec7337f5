//! Scroll trigger for infinite scrolling.
//!
//! Scroll events are rate-limited: at most one position check runs per interval.
//! Events inside the interval are coalesced into a single trailing check that the
//! runtime schedules with a timer, so the last position is never lost.

use std::time::{Duration, Instant};

/// Viewport geometry reported with a scroll event, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    /// Whether the bottom of the viewport is within `threshold` of the end.
    #[must_use]
    pub const fn near_bottom(&self, threshold: u32) -> bool {
        self.scroll_top.saturating_add(self.viewport_height)
            >= self.scroll_height.saturating_sub(threshold)
    }
}

/// Result of feeding one scroll event to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Check these metrics now.
    Check(ScrollMetrics),
    /// Start a timer with this token; the check runs when it fires.
    Defer { token: u64, after: Duration },
    /// A trailing check is already scheduled and will use these metrics.
    Coalesced,
}

/// Per-instance rate limiter for scroll checks.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold_px: u32,
    interval: Duration,
    last_check: Option<Instant>,
    pending: Option<ScrollMetrics>,
    token: u64,
    armed: bool,
}

impl ScrollTrigger {
    #[must_use]
    pub const fn new(threshold_px: u32, interval: Duration) -> Self {
        Self {
            threshold_px,
            interval,
            last_check: None,
            pending: None,
            token: 0,
            armed: false,
        }
    }

    #[must_use]
    pub const fn threshold_px(&self) -> u32 {
        self.threshold_px
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> ScrollDecision {
        let elapsed = self.last_check.map(|last| now.saturating_duration_since(last));

        match elapsed {
            Some(elapsed) if elapsed < self.interval => {
                self.pending = Some(metrics);
                if self.armed {
                    return ScrollDecision::Coalesced;
                }
                self.armed = true;
                self.token += 1;
                ScrollDecision::Defer {
                    token: self.token,
                    after: self.interval.saturating_sub(elapsed),
                }
            }
            _ => {
                self.last_check = Some(now);
                self.pending = None;
                ScrollDecision::Check(metrics)
            }
        }
    }

    /// Handles the trailing timer. Returns the coalesced metrics to check.
    pub fn on_timer(&mut self, token: u64, now: Instant) -> Option<ScrollMetrics> {
        if !self.armed || token != self.token {
            return None;
        }
        self.armed = false;
        self.last_check = Some(now);
        self.pending.take()
    }

    #[must_use]
    pub const fn near_bottom(&self, metrics: &ScrollMetrics) -> bool {
        metrics.near_bottom(self.threshold_px)
    }
}
