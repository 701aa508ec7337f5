//! Tracing initialization and subscriber setup.

use super::file_writer::RotatingFileWriter;
use crate::infrastructure::paths;
use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Initializes the tracing subscriber with rotating file output.
///
/// Sets up a subscriber pipeline that:
/// 1. Filters events with the configured `trace_level` (default `"info"`)
/// 2. Formats them as plain text lines without ANSI colors
/// 3. Appends them to `<data_dir>/tapestry-client.log`, rotating at 10MB
///
/// # Initialization Behavior
///
/// - Creates the data directory if it doesn't exist
/// - Silently does nothing if the directory cannot be created
/// - An unparsable filter falls back to `"info"`
/// - Idempotent: only the first call installs a subscriber
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);

    let data_dir = paths::data_dir(config);
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let writer = RotatingFileWriter::new(paths::log_path(config));

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
