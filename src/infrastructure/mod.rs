//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where the client keeps its preferences and log files, honoring a
//! configured data directory before falling back to the platform default.

pub mod paths;

pub use paths::{data_dir, default_data_dir, expand_tilde, log_path, preferences_path};
