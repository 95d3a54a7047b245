// Shared fixtures for route tests: a stub resolver and a router wired to a
// wiremock upstream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::models::User;
use crate::proxy::config::{ApiUrls, RewardsConfig};
use crate::proxy::platform::{AuthError, UserResolver};
use crate::proxy::server::{build_router, AppState};
use crate::proxy::upstream::UpstreamClient;

pub const MOUNT: &str = "/api/ext/swell-rewards";

pub struct StubResolver {
    result: Result<User, AuthError>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn user(id: &str, email: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(User {
                id: Value::String(id.to_string()),
                email: email.to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: StatusCode, payload: Value) -> Arc<Self> {
        Arc::new(Self {
            result: Err(AuthError::new(status, payload)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserResolver for StubResolver {
    async fn resolve_user(&self, _token: &str) -> Result<User, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn rewards_config(upstream_base: &str) -> RewardsConfig {
    RewardsConfig {
        api_url: ApiUrls {
            v1: format!("{}/api/v1", upstream_base),
            v2: format!("{}/api/v2", upstream_base),
        },
        merchant_id: "merchant-1".to_string(),
        guid: "guid-1".to_string(),
        api_key: "key-1".to_string(),
    }
}

pub fn test_app(upstream_base: &str, resolver: Arc<dyn UserResolver>) -> Router {
    let rewards = rewards_config(upstream_base);
    let upstream = UpstreamClient::new(&rewards, reqwest::Client::new()).expect("upstream client");
    let state = AppState::new(rewards, upstream, resolver);
    build_router(state, MOUNT)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("{}{}", MOUNT, uri))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("{}{}", MOUNT, uri))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// POST with no body and no content type
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("{}{}", MOUNT, uri))
        .body(Body::empty())
        .expect("request")
}

/// Drive one request through the router and decode the JSON answer
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body bytes");
    let body = if bytes.is_empty() {
        json!(null)
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
