use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;
use crate::proxy::config::check_http_url;

const DATA_DIR: &str = ".swell_rewards_proxy";
const CONFIG_FILE: &str = "config.json";

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "SWELL_PROXY_CONFIG";

/// Get data directory path, creating it on first use
pub fn get_data_dir() -> AppResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AppError::Config("Failed to get user home directory".to_string()))?;
    let data_dir = home.join(DATA_DIR);

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

fn config_path() -> AppResult<PathBuf> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(get_data_dir()?.join(CONFIG_FILE)),
    }
}

/// Load application config
///
/// A missing file is replaced by the defaults, which are written back so
/// they can be edited. Environment overrides are applied last.
pub fn load_app_config() -> AppResult<AppConfig> {
    let config_path = config_path()?;

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?
    } else {
        let config = AppConfig::new();
        save_app_config_to(&config, &config_path)?;
        tracing::info!("Wrote default config to {}", config_path.display());
        config
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_app_config(&config)?;

    Ok(config)
}

/// Write the config as pretty JSON, creating the parent directory
fn save_app_config_to(config: &AppConfig, path: &PathBuf) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Secrets and the port can come from the environment instead of the file
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("SWELL_REWARDS_API_KEY") {
        config.rewards.api_key = key;
    }
    if let Some(guid) = lookup("SWELL_REWARDS_GUID") {
        config.rewards.guid = guid;
    }
    if let Some(merchant_id) = lookup("SWELL_REWARDS_MERCHANT_ID") {
        config.rewards.merchant_id = merchant_id;
    }
    if let Some(port) = lookup("SWELL_PROXY_PORT") {
        config.proxy.port = port
            .parse()
            .map_err(|_| AppError::Config(format!("SWELL_PROXY_PORT is not a port: {}", port)))?;
    }
    Ok(())
}

pub fn validate_app_config(config: &AppConfig) -> AppResult<()> {
    config.rewards.validate()?;
    check_http_url("platform.endpoint", &config.platform.endpoint)?;

    if !config.proxy.mount_path.is_empty() && !config.proxy.mount_path.starts_with('/') {
        return Err(AppError::Config(format!(
            "proxy.mount_path must start with '/': {}",
            config.proxy.mount_path
        )));
    }
    Ok(())
}
