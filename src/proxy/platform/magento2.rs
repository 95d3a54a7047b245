// Magento 2 REST: GET /V1/customers/me with the customer token as bearer
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{AuthError, UserResolver};
use crate::models::{PlatformConfig, User};

pub struct Magento2Adapter {
    client: Client,
    endpoint: String,
}

impl Magento2Adapter {
    pub fn new(endpoint: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

pub fn create(config: &PlatformConfig, client: Client) -> Arc<dyn UserResolver> {
    Arc::new(Magento2Adapter::new(&config.endpoint, client))
}

#[async_trait]
impl UserResolver for Magento2Adapter {
    async fn resolve_user(&self, token: &str) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::missing_token());
        }

        let url = format!("{}/V1/customers/me", self.endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(AuthError::unavailable)?;

        let status = response.status();
        let body = response.bytes().await.map_err(AuthError::unavailable)?;
        if !status.is_success() {
            return Err(AuthError::from_platform(status, &body));
        }

        let record: Value = serde_json::from_slice(&body)
            .map_err(|e| AuthError::unavailable(format!("invalid customer record: {}", e)))?;
        User::from_record(&record)
            .ok_or_else(|| AuthError::unavailable("customer record has no id or email"))
    }
}
