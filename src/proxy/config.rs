use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Proxy service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Allow LAN access
    /// - false: only 127.0.0.1 (default)
    /// - true: listen on 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listening port
    pub port: u16,

    /// Path the rewards routes are nested under
    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Outbound proxy for upstream calls
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

/// Outbound proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

/// Swell Rewards API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    pub api_url: ApiUrls,
    #[serde(default)]
    pub merchant_id: String,
    /// Sent as `x-guid` on every v2 call
    #[serde(default)]
    pub guid: String,
    /// Sent as `x-api-key` on every v2 call
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUrls {
    pub v1: String,
    pub v2: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: 8045,
            mount_path: default_mount_path(),
            request_timeout: default_request_timeout(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            api_url: ApiUrls {
                v1: "https://loyalty.yotpo.com/api/v1".to_string(),
                v2: "https://loyalty.yotpo.com/api/v2".to_string(),
            },
            merchant_id: String::new(),
            guid: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_mount_path() -> String {
    "/api/ext/swell-rewards".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl ProxyConfig {
    /// Actual listen address
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

impl RewardsConfig {
    pub fn validate(&self) -> AppResult<()> {
        check_http_url("rewards.api_url.v1", &self.api_url.v1)?;
        check_http_url("rewards.api_url.v2", &self.api_url.v2)?;

        if self.guid.is_empty() || self.api_key.is_empty() {
            tracing::warn!("Swell guid or api key is empty, v2 calls will be rejected upstream");
        }
        if self.merchant_id.is_empty() {
            tracing::warn!("Swell merchant id is empty, v1 calls will be rejected upstream");
        }
        Ok(())
    }
}

/// Require an absolute http(s) URL
pub fn check_http_url(field: &str, value: &str) -> AppResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| AppError::Config(format!("{} is not a valid URL ({}): {}", field, value, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!(
            "{} must use http or https, got {}",
            field, other
        ))),
    }
}
