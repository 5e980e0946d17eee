//! REST error types.

use thiserror::Error;

use crate::infrastructure::config::ConfigError;

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum RestError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Vendor `error`/`message` field, or the raw body.
        message: String,
    },

    /// The base URL or a rendered path is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// An endpoint template is malformed.
    #[error("invalid path template: {0}")]
    InvalidPath(String),

    /// A path placeholder had no value.
    #[error("missing path segment: {0}")]
    MissingPathSegment(String),

    /// The response body was not JSON.
    #[error("JSON parsing error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be configured.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RestError {
    /// HTTP status, if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_and_status() {
        let err = RestError::Api {
            status: 404,
            message: "Ticker not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): Ticker not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(RestError::MissingPathSegment("ticker".to_string()).status(), None);
    }
}
