use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::proxy::platform::AuthError;
use crate::proxy::upstream::BodyDecodeError;

/// Everything that can end a proxied request early
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing required field; nothing was sent upstream
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    BadUpstreamBody(#[from] BodyDecodeError),

    #[error("Failed to encode upstream payload: {0}")]
    Encode(#[from] serde_json::Error),
}

pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = s[..end].to_string();
    out.push('…');
    out
}

pub fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

fn transport_kind(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_builder() {
        "builder"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else {
        "request"
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Validation(message) => message_response(StatusCode::BAD_REQUEST, message),
            ProxyError::Auth(err) => {
                tracing::warn!("User resolution failed ({}): {}", err.status, err.payload);
                (err.status, Json(err.payload)).into_response()
            }
            ProxyError::Transport(err) => {
                tracing::error!("Upstream transport error: {}", err);
                let body: Value = json!({
                    "message": err.to_string(),
                    "kind": transport_kind(&err),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ProxyError::BadUpstreamBody(err) => {
                tracing::error!("Undecodable upstream body: {}", err);
                let body = json!({
                    "message": "Bad upstream response",
                    "body": truncate_utf8(&err.raw, 400),
                });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            ProxyError::Encode(err) => {
                tracing::error!("Failed to encode upstream payload: {}", err);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}
