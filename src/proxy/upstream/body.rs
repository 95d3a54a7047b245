// Upstream body decoding
//
// Swell answers with JSON, but not always with a JSON content type, and some
// endpoints double-encode the document as a JSON string.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

/// What to do with a body that is not JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPolicy {
    /// Non-JSON is a bad upstream response
    #[default]
    Strict,
    /// Non-JSON is relayed as a JSON string
    Lenient,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Empty,
    Json(Value),
    Text(String),
}

#[derive(Debug, Error)]
#[error("Upstream body is not valid JSON: {reason}")]
pub struct BodyDecodeError {
    pub raw: String,
    pub reason: String,
}

impl UpstreamBody {
    pub fn decode(bytes: &[u8], policy: BodyPolicy) -> Result<Self, BodyDecodeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(UpstreamBody::Empty);
        }

        let text = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(inner)) if policy == BodyPolicy::Strict => {
                Ok(UpstreamBody::Json(decode_nested(inner)))
            }
            Ok(value) => Ok(UpstreamBody::Json(value)),
            Err(e) => match policy {
                BodyPolicy::Strict => Err(BodyDecodeError {
                    raw: text.into_owned(),
                    reason: e.to_string(),
                }),
                BodyPolicy::Lenient => Ok(UpstreamBody::Text(text.into_owned())),
            },
        }
    }
}

// A string holding an object or array is a double-encoded document; only the
// strict routes unwrap it
fn decode_nested(inner: String) -> Value {
    match serde_json::from_str::<Value>(&inner) {
        Ok(value) if value.is_object() || value.is_array() => value,
        _ => Value::String(inner),
    }
}

/// Upstream status and decoded body, ready to relay
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: UpstreamBody,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        match self.body {
            UpstreamBody::Empty => self.status.into_response(),
            UpstreamBody::Json(value) => (self.status, Json(value)).into_response(),
            UpstreamBody::Text(text) => (self.status, Json(Value::String(text))).into_response(),
        }
    }
}
