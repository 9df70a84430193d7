//! Error types for the gallery client.
//!
//! Provides a single error type using `thiserror`. Every failure an engine
//! operation can hit is normalized into [`GalleryError`], and its `Display`
//! output is the message shown to the user.

use std::io;
use serde::Serialize;
use thiserror::Error;

/// Upload input errors, reported per file.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// File name has no usable extension or an unsupported one
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    /// Payload is empty
    #[error("File is empty: {0}")]
    Empty(String),
    /// Payload exceeds the configured upload limit
    #[error("File {name} is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// Main error type for the gallery client.
///
/// Transport failures and server rejections both end up here; callers get a
/// single channel with a human-readable message and no retry taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum GalleryError {
    /// An operation needed a session and none was present
    #[error("User ID not found. Please log in again.")]
    Unauthenticated,

    /// Network unreachable, timed out, or the connection dropped
    #[error("Unable to connect to server: {0}")]
    Transport(String),

    /// Non-2xx response from the API
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Batch operation requested with nothing selected
    #[error("No images selected")]
    EmptySelection,

    /// Upload input rejected before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Local file IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Response body could not be decoded
    #[error("Invalid server response: {0}")]
    Decode(String),

    /// Configuration missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity provider rejected an auth operation
    #[error("{0}")]
    Auth(String),
}

/// Convenience result type for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;

impl GalleryError {
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth<T: Into<String>>(msg: T) -> Self {
        Self::Auth(msg.into())
    }

    /// Builds a server rejection, falling back to the status line when the
    /// body carried no message.
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        Self::Server { status, message }
    }
}

impl From<io::Error> for GalleryError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for GalleryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::server(status.as_u16(), None)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_prefers_body_message() {
        let err = GalleryError::server(403, Some("Quota exceeded".into()));
        assert_eq!(err.to_string(), "Quota exceeded");
    }

    #[test]
    fn server_error_falls_back_to_status() {
        let err = GalleryError::server(500, None);
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        let blank = GalleryError::server(502, Some("  ".into()));
        assert_eq!(blank.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn validation_errors_pass_through_display() {
        let err: GalleryError = ValidationError::Empty("a.png".into()).into();
        assert_eq!(err.to_string(), "File is empty: a.png");
    }

    #[test]
    fn io_error_converts() {
        let err: GalleryError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, GalleryError::Io(_)));
    }
}
