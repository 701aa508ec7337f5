//! Error types for the gallery client.
//!
//! This module defines the centralized error type [`GalleryError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! Errors never escape the event loop as fatal conditions. Backend and transport
//! failures are converted into [`ApiFailure`](crate::worker::ApiFailure) values at
//! the worker boundary and degrade to an empty/error placeholder in the view.

use thiserror::Error;

/// The main error type for gallery client operations.
///
/// Variants follow the failure taxonomy of the orchestrator: transport failures,
/// backend-reported application errors, malformed drag payloads, and invalid local
/// state, plus the I/O and configuration errors of the ambient layers.
///
/// # Examples
///
/// ```
/// use tapestry_client::GalleryError;
///
/// fn require_dataset(dataset: Option<&str>) -> Result<&str, GalleryError> {
///     dataset.ok_or_else(|| GalleryError::InvalidState("no dataset selected".to_string()))
/// }
///
/// assert!(require_dataset(None).is_err());
/// ```
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Network or transport failure while talking to the backend.
    ///
    /// Wraps errors from `reqwest` (connection refused, timeouts, invalid URLs).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered, but reported an application error.
    ///
    /// Raised for non-2xx responses and for 2xx bodies carrying an explicit
    /// `error` field.
    #[error("Backend error ({status}): {message}")]
    Backend {
        /// HTTP status code of the response.
        status: u16,
        /// Error message from the response body, or the status reason.
        message: String,
    },

    /// The backend answered with a body that does not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A drop event carried a payload that could not be parsed.
    ///
    /// Never surfaced to the user; the gesture resolves to a no-op.
    #[error("Malformed drag payload: {0}")]
    DragPayload(String),

    /// A requested action does not make sense in the current local state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Wraps errors from standard library I/O operations. Automatically converts
    /// from `std::io::Error` using the `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GalleryError {
    /// Returns `true` for failures reported by the backend itself, as opposed to
    /// transport or decoding problems.
    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

/// A specialized `Result` type for gallery client operations.
///
/// This is a type alias for `std::result::Result<T, GalleryError>`.
pub type Result<T> = std::result::Result<T, GalleryError>;
