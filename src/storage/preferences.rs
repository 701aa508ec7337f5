//! JSON file store for the one persisted user preference.
//!
//! Everything else in the gallery session is rebuilt from the backend on startup.
//! Only the preferred grid column count survives across sessions. Writes are
//! atomic (write-to-temp + rename) so a crash never leaves a corrupt file.

use crate::domain::error::{GalleryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of grid columns when no preference is stored.
pub const DEFAULT_GRID_COLUMNS: u8 = 4;

/// Minimum width in pixels of a single grid column.
pub const MIN_COLUMN_WIDTH_PX: u32 = 100;

/// Persisted preferences.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "grid_columns": 5,
///   "updated_at": "2024-05-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Version of the file format for future migrations.
    pub version: u32,

    /// Preferred number of grid columns.
    pub grid_columns: u8,

    /// When the preference was last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: 1,
            grid_columns: DEFAULT_GRID_COLUMNS,
            updated_at: None,
        }
    }
}

impl Preferences {
    /// Returns preferences with a new column count, clamped to what fits in the
    /// container: between 1 and one column per [`MIN_COLUMN_WIDTH_PX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tapestry_client::storage::Preferences;
    ///
    /// let prefs = Preferences::default().with_grid_columns(12, 640);
    /// assert_eq!(prefs.grid_columns, 6);
    /// let prefs = Preferences::default().with_grid_columns(0, 640);
    /// assert_eq!(prefs.grid_columns, 1);
    /// ```
    #[must_use]
    pub fn with_grid_columns(&self, requested: u32, container_width: u32) -> Self {
        let max_columns = (container_width / MIN_COLUMN_WIDTH_PX).clamp(1, u32::from(u8::MAX));
        let columns = requested.clamp(1, max_columns);

        Self {
            grid_columns: u8::try_from(columns).unwrap_or(u8::MAX),
            updated_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}

/// File-backed preference store.
#[derive(Debug)]
pub struct PreferenceStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,
}

impl PreferenceStore {
    /// Creates a store at `file_path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { file_path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads stored preferences, falling back to defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Preferences> {
        if !self.file_path.exists() {
            tracing::debug!(path = ?self.file_path, "no stored preferences, using defaults");
            return Ok(Preferences::default());
        }

        let contents = std::fs::read_to_string(&self.file_path)?;
        let prefs: Preferences = serde_json::from_str(&contents)
            .map_err(|e| GalleryError::Config(format!("failed to parse preferences: {e}")))?;

        tracing::debug!(grid_columns = prefs.grid_columns, "loaded preferences");
        Ok(prefs)
    }

    /// Saves preferences using an atomic write.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string_pretty(prefs)?;
        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!(grid_columns = prefs.grid_columns, "preferences saved");
        Ok(())
    }
}
