//! Stream Codec
//!
//! JSON encoding for outbound commands and decoding for inbound frames.
//!
//! An inbound frame is either one object or an array of objects:
//!
//! ```json
//! {"ev":"status","status":"connected","message":"Connected Successfully"}
//! [{"ev":"T","sym":"AAPL","p":150.0,"s":10},{"ev":"T","sym":"MSFT","p":300.0,"s":5}]
//! ```
//!
//! Array elements that are not objects are skipped; the rest keep their
//! order.

use serde_json::Value;

use super::messages::Command;
use crate::domain::streaming::InboundEvent;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is neither an object nor an array.
    #[error("invalid frame format: expected JSON object or array, got {0}")]
    InvalidFormat(&'static str),
}

/// JSON codec for the socket feed.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a text frame into classified events, in frame order.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not JSON or is a bare scalar.
    pub fn decode(&self, text: &str) -> Result<Vec<InboundEvent>, CodecError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(vec![InboundEvent::classify(fields)]),
            Value::Array(elements) => Ok(elements
                .into_iter()
                .filter_map(|element| match element {
                    Value::Object(fields) => Some(InboundEvent::classify(fields)),
                    other => {
                        tracing::trace!(element = %other, "Skipping non-object frame element");
                        None
                    }
                })
                .collect()),
            other => Err(CodecError::InvalidFormat(json_type(&other))),
        }
    }

    /// Encode a command to its wire text.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(&self, command: &Command) -> Result<String, CodecError> {
        Ok(serde_json::to_string(command)?)
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
