use crate::proxy::platform::Platform;
use crate::proxy::{ProxyConfig, RewardsConfig};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
}

/// Storefront platform used to resolve the calling customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: Platform,
    /// Base URL of the platform API, e.g. `https://shop.example.com/rest`
    pub endpoint: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            rewards: RewardsConfig::default(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: Platform::Magento2,
            endpoint: "http://localhost:8080/rest".to_string(),
        }
    }
}
