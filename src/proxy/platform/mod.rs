// Storefront platform adapters
//
// An adapter turns the customer token the storefront hands out into the
// customer's id and email. Which adapter is used is decided by configuration.

pub mod magento1;
pub mod magento2;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::{AppError, AppResult};
use crate::models::{PlatformConfig, User};

/// Failed user resolution: status and payload are relayed to the caller as-is
#[derive(Debug, Clone, Error)]
#[error("User resolution failed ({status}): {payload}")]
pub struct AuthError {
    pub status: StatusCode,
    pub payload: Value,
}

impl AuthError {
    pub fn new(status: StatusCode, payload: Value) -> Self {
        Self { status, payload }
    }

    pub fn missing_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Customer token is required." }),
        )
    }

    /// The platform answered with an error status
    ///
    /// 401/403 mean the token was rejected; anything else is the platform
    /// failing and stays a 500.
    pub fn from_platform(status: StatusCode, body: &[u8]) -> Self {
        let payload = serde_json::from_slice::<Value>(body).unwrap_or_else(|_| {
            json!({ "message": String::from_utf8_lossy(body).trim().to_string() })
        });
        let status = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, payload)
    }

    pub fn unavailable(err: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": format!("Platform unavailable: {}", err) }),
        )
    }
}

#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve_user(&self, token: &str) -> Result<User, AuthError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Magento2,
    Magento1,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Magento2 => "magento2",
            Platform::Magento1 => "magento1",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type AdapterFactory = fn(&PlatformConfig, Client) -> Arc<dyn UserResolver>;

/// Platform -> adapter constructor
pub struct PlatformRegistry {
    factories: HashMap<Platform, AdapterFactory>,
}

impl PlatformRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, platform: Platform, factory: AdapterFactory) {
        self.factories.insert(platform, factory);
    }

    pub fn get_adapter(
        &self,
        config: &PlatformConfig,
        client: Client,
    ) -> AppResult<Arc<dyn UserResolver>> {
        let factory = self.factories.get(&config.name).ok_or_else(|| {
            AppError::Platform(format!("No adapter registered for platform {}", config.name))
        })?;
        tracing::info!("Using {} adapter at {}", config.name, config.endpoint);
        Ok(factory(config, client))
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Platform::Magento2, magento2::create);
        registry.register(Platform::Magento1, magento1::create);
        registry
    }
}
