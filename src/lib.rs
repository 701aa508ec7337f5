//! Tapestry client: interaction and synchronization orchestrator for an image
//! gallery backed by a remote image service.
//!
//! The client provides:
//! - Paged browsing of a dataset with rate-limited infinite scroll
//! - Debounced text search and search-by-image
//! - Collections with drag-and-drop membership and optimistic reordering
//! - Background polling of the dataset's processing status
//! - Persisted display preferences (grid column count)

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Headless driver (main.rs) + Runtime (runtime.rs)   │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling                                   │  ← No I/O
//! │  - Action dispatching                               │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Storage Layer │   │ Worker Layer  │
//! │ (ui/)         │   │ (storage/)    │   │ (worker/)     │
//! │ - View models │   │ - Backend API │   │ - Typed calls │
//! │ - Text render │   │ - HTTP client │   │ - Replies     │
//! │               │   │ - Preferences │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data directory paths (infrastructure/)           │
//! │  - Error types (domain/error)                       │
//! │  - Images, collections, datasets (domain/)          │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing-subscriber with rotating log file        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Application state machine with event/action model
//! - [`domain`]: Core domain types (images, collections, errors)
//! - [`infrastructure`]: Data directory resolution
//! - [`storage`]: Backend trait, HTTP backend, preference store
//! - [`worker`]: Typed request/reply messages and their executor
//! - [`ui`]: View models and text rendering
//! - [`observability`]: Log subscriber setup
//! - [`runtime`]: tokio event loop executing actions
//!
//! # Configuration
//!
//! The client reads a TOML file; every key is optional:
//!
//! ```toml
//! server_url = "http://localhost:5000"
//! dataset_id = "holidays"
//! page_size = 100
//! search_limit = 20
//! debounce_ms = 300
//! poll_interval_ms = 2000
//! scroll_threshold_px = 100
//! scroll_interval_ms = 150
//! trace_level = "debug"
//! data_dir = "~/.local/share/tapestry-client"
//! ```
//!
//! # Request Staleness
//!
//! Every call that can race carries a [`worker::Ticket`]. The controller bumps an
//! epoch on each context transition, and a reply is applied only when its ticket
//! is the one in flight for the current epoch. Late replies from an abandoned
//! dataset, collection or query are logged and dropped.
//!
//! # Examples
//!
//! ```rust
//! use tapestry_client::{handle_event, initialize, Action, Config, Event};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = Config {
//!     dataset_id: Some("holidays".to_string()),
//!     data_dir: Some(dir.path().to_path_buf()),
//!     ..Default::default()
//! };
//!
//! let mut session = initialize(&config);
//! let (_render, actions) = handle_event(&mut session, &Event::Init)?;
//! assert!(actions.len() >= 3);
//! assert!(matches!(actions[0], Action::Call(_)));
//! # Ok::<(), tapestry_client::GalleryError>(())
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod storage;
pub mod worker;

pub mod ui;

pub mod observability;
pub mod runtime;

pub use app::{handle_event, Action, Event, GallerySession};
pub use domain::{GalleryError, Result};

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{PreferenceStore, Preferences};

/// Client configuration.
///
/// Loaded from a TOML file with [`Config::from_toml_file`]. Missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the image service. Default: `http://localhost:5000`
    pub server_url: String,

    /// Dataset to select at startup. When unset, or not among the listed
    /// datasets, the first listed dataset is selected.
    pub dataset_id: Option<String>,

    /// Images per page while browsing. Default: 100
    pub page_size: u32,

    /// Maximum number of search results. Default: 20
    pub search_limit: u32,

    /// Quiet period of the search box before a search is issued. Default: 300
    pub debounce_ms: u64,

    /// Interval between processing status polls. Default: 2000
    pub poll_interval_ms: u64,

    /// Distance from the bottom of the grid that triggers the next page. Default: 100
    pub scroll_threshold_px: u32,

    /// Minimum interval between scroll evaluations. Default: 150
    pub scroll_interval_ms: u64,

    /// Log filter directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any `EnvFilter`
    /// directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Directory for preferences and logs. A leading `~` is expanded.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            dataset_id: None,
            page_size: 100,
            search_limit: 20,
            debounce_ms: 300,
            poll_interval_ms: 2000,
            scroll_threshold_px: 100,
            scroll_interval_ms: 150,
            trace_level: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Io` if the file cannot be read and
    /// `GalleryError::Config` if it is not valid TOML for this struct.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| GalleryError::Config(format!("{}: {e}", path.display())))
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }
}

/// Creates a session from configuration.
///
/// Loads display preferences from the data directory. A missing or unreadable
/// preference file yields the defaults; the failure is logged, never fatal.
#[must_use]
pub fn initialize(config: &Config) -> GallerySession {
    tracing::debug!(server_url = %config.server_url, dataset_id = ?config.dataset_id, "initializing client");

    let preferences = PreferenceStore::new(infrastructure::preferences_path(config))
        .and_then(|store| store.load())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load preferences, using defaults");
            Preferences::default()
        });

    GallerySession::new(config, preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            "server_url = \"http://gallery:8080\"\ndataset_id = \"trip\"\npoll_interval_ms = 500\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();

        assert_eq!(config.server_url, "http://gallery:8080");
        assert_eq!(config.dataset_id.as_deref(), Some("trip"));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "page_size = \"many\"").unwrap();

        assert!(matches!(Config::from_toml_file(&path), Err(GalleryError::Config(_))));
    }

    #[test]
    fn initialize_reads_saved_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let store = PreferenceStore::new(infrastructure::preferences_path(&config)).unwrap();
        store.save(&Preferences::default().with_grid_columns(6, 1200)).unwrap();

        let session = initialize(&config);

        assert_eq!(session.preferences.grid_columns, 6);
    }
}
