//! Debounced input gate for the search box.
//!
//! Keystrokes arrive as a rapid stream of full-text snapshots. The gate keeps only
//! the latest one and asks the runtime for a timer; when a timer fires, only the
//! token issued by the most recent [`DebounceGate::submit`] is honoured, so any
//! earlier timers that still fire are ignored.
//!
//! Each gate owns its token counter. Two gates never see each other's timers.

use std::time::Duration;

/// What the search box asks for once the quiet period has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    /// Run a text search for the trimmed query.
    Search(String),
    /// The box was emptied: leave search and reload page 1 of the dataset.
    Clear,
}

impl SearchIntent {
    /// Routes blank text to [`SearchIntent::Clear`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::Clear
        } else {
            Self::Search(trimmed.to_string())
        }
    }
}

/// Coalesces a burst of submissions into one delayed action.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    delay: Duration,
    token: u64,
    pending: Option<String>,
}

impl DebounceGate {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            token: 0,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Records `text` as the latest input and returns the token of the timer the
    /// caller must start. Any previously issued token is superseded.
    pub fn submit(&mut self, text: &str) -> u64 {
        self.token += 1;
        self.pending = Some(text.to_string());
        tracing::trace!(token = self.token, "debounce rescheduled");
        self.token
    }

    /// Handles a fired timer. Returns the intent only for the current token.
    pub fn fire(&mut self, token: u64) -> Option<SearchIntent> {
        if token != self.token {
            tracing::trace!(token, current = self.token, "superseded debounce timer ignored");
            return None;
        }
        self.pending.take().map(|text| SearchIntent::from_text(&text))
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_submission_fires() {
        let mut gate = DebounceGate::new(Duration::from_millis(300));
        let first = gate.submit("a");
        let second = gate.submit("ab");
        let third = gate.submit("abc");

        assert_eq!(gate.fire(first), None);
        assert_eq!(gate.fire(second), None);
        assert_eq!(gate.fire(third), Some(SearchIntent::Search("abc".to_string())));
        assert_eq!(gate.fire(third), None);
    }

    #[test]
    fn blank_text_routes_to_clear() {
        let mut gate = DebounceGate::new(Duration::from_millis(300));
        let token = gate.submit("   ");
        assert_eq!(gate.fire(token), Some(SearchIntent::Clear));
        assert_eq!(SearchIntent::from_text("  cat "), SearchIntent::Search("cat".to_string()));
    }

    #[test]
    fn gates_do_not_share_tokens() {
        let mut left = DebounceGate::new(Duration::from_millis(300));
        let mut right = DebounceGate::new(Duration::from_millis(300));

        let left_token = left.submit("left");
        let _ = right.submit("right");
        let right_token = right.submit("right again");

        assert_eq!(left.fire(left_token), Some(SearchIntent::Search("left".to_string())));
        assert_eq!(
            right.fire(right_token),
            Some(SearchIntent::Search("right again".to_string()))
        );
    }
}
