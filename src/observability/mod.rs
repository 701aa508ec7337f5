//! Structured logging with file-based output.
//!
//! Log events from the `tracing` macros are formatted by `tracing-subscriber`
//! and appended to a rotating log file in the client's data directory. Nothing
//! is written to stdout, which belongs to the rendered frames.
//!
//! # Architecture
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → RotatingFileWriter → log file
//! ```
//!
//! # Features
//!
//! - **File Output**: Logs go to `<data_dir>/tapestry-client.log`
//! - **Automatic Rotation**: Files rotate at 10MB with 3-backup retention
//!
//! # Configuration
//!
//! The filter is taken from the `trace_level` config option and defaults to
//! `"info"`. Any `EnvFilter` directive works, e.g. `tapestry_client=debug`.
//!
//! # Usage
//!
//! ```rust
//! use tapestry_client::observability::init_tracing;
//! use tapestry_client::Config;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = Config {
//!     data_dir: Some(dir.path().to_path_buf()),
//!     ..Default::default()
//! };
//! init_tracing(&config);
//!
//! tracing::debug!("client initialized");
//! ```
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`file_writer`]: Rotating file writer with size-based rotation

mod file_writer;
mod init;

pub use file_writer::RotatingFileWriter;
pub use init::init_tracing;
