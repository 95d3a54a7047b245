// Magento 1 through the VSBridge module: GET /user/me?token=...
//
// VSBridge wraps every answer as {code, result} and may report failures with
// an HTTP 200 and a non-200 `code`.
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde_json::Value;

use super::{AuthError, UserResolver};
use crate::models::{PlatformConfig, User};

pub struct Magento1Adapter {
    client: Client,
    endpoint: String,
}

impl Magento1Adapter {
    pub fn new(endpoint: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

pub fn create(config: &PlatformConfig, client: Client) -> Arc<dyn UserResolver> {
    Arc::new(Magento1Adapter::new(&config.endpoint, client))
}

#[async_trait]
impl UserResolver for Magento1Adapter {
    async fn resolve_user(&self, token: &str) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::missing_token());
        }

        let url = format!("{}/user/me", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await
            .map_err(AuthError::unavailable)?;

        let status = response.status();
        let body = response.bytes().await.map_err(AuthError::unavailable)?;
        if !status.is_success() {
            return Err(AuthError::from_platform(status, &body));
        }

        let envelope: Value = serde_json::from_slice(&body)
            .map_err(|e| AuthError::unavailable(format!("invalid bridge response: {}", e)))?;

        let code = envelope
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::OK);
        if !code.is_success() {
            return Err(AuthError::from_platform(code, &body));
        }

        envelope
            .get("result")
            .and_then(User::from_record)
            .ok_or_else(|| AuthError::unavailable("bridge result has no id or email"))
    }
}
