//! Path resolution for the client's data directory.
//!
//! Everything the client writes lives in a single directory: the preferences
//! file and the rotating log. The directory is taken from `Config::data_dir`
//! when set, otherwise from the platform data directory.

use crate::Config;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tapestry-client";
const PREFERENCES_FILE: &str = "preferences.json";
const LOG_FILE: &str = "tapestry-client.log";

/// Returns the platform default data directory for the client.
///
/// Resolves to `$XDG_DATA_HOME/tapestry-client` (usually
/// `~/.local/share/tapestry-client`) on Linux and the equivalent location on
/// other platforms. Falls back to `./.tapestry-client` when the platform
/// reports no data directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(format!(".{APP_DIR}")), |dir| dir.join(APP_DIR))
}

/// Returns the data directory in effect for `config`.
#[must_use]
pub fn data_dir(config: &Config) -> PathBuf {
    config
        .data_dir
        .as_deref()
        .map_or_else(default_data_dir, |dir| expand_tilde(dir))
}

#[must_use]
pub fn preferences_path(config: &Config) -> PathBuf {
    data_dir(config).join(PREFERENCES_FILE)
}

#[must_use]
pub fn log_path(config: &Config) -> PathBuf {
    data_dir(config).join(LOG_FILE)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, and all paths when no home directory is
/// known, are returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tapestry_client::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde(Path::new("/absolute/path")), Path::new("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/gallery")),
            ..Default::default()
        };

        assert_eq!(preferences_path(&config), Path::new("/tmp/gallery/preferences.json"));
        assert_eq!(log_path(&config), Path::new("/tmp/gallery/tapestry-client.log"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with(APP_DIR) || default_data_dir().ends_with(".tapestry-client"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde(Path::new("~/pics")), home.join("pics"));
        assert_eq!(expand_tilde(Path::new("~")), home);
        assert_eq!(expand_tilde(Path::new("relative/~")), Path::new("relative/~"));
    }
}
