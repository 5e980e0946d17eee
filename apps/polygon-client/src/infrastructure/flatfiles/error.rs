//! Flat-file error types.

use thiserror::Error;

use crate::infrastructure::config::ConfigError;

/// Errors from the flat-file client.
#[derive(Debug, Error)]
pub enum FlatFileError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The object store answered with a non-success status.
    #[error("object store returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (usually an S3 XML error document).
        body: String,
    },

    /// Local file failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
