//! HTTP client error types

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP client errors
///
/// Failures from the transport, serializers and the filesystem are carried
/// through unchanged. A non-2xx status is never an error here; callers
/// inspect [`reqwest::Response::status`] themselves.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network request failed (connect, timeout, body read, ...)
    #[error("Network request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// A header name or value could not be encoded
    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// Cookie jar could not be constructed
    #[error("Failed to build cookie jar: {0}")]
    CookieJar(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// Filesystem or reader failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response declared a charset with no known decoder
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The response body is not valid in its declared charset
    #[error("Body is not valid {charset}")]
    Decode { charset: String },

    /// The client's cancellation token fired before the response arrived
    #[error("Request cancelled")]
    Cancelled,
}

impl HttpError {
    /// Check if the error is a request deadline expiring
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Request(e) if e.is_timeout())
    }
}
