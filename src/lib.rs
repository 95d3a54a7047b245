pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Proxy service module
mod utils;

use error::{AppError, AppResult};
use modules::logger;
use proxy::platform::PlatformRegistry;
use proxy::upstream::UpstreamClient;
use proxy::{AppState, AxumServer};
use tracing::{error, info};

/// Load config, serve until Ctrl-C
pub async fn run() -> AppResult<()> {
    // Initialize logger
    logger::init_logger();

    let config = modules::load_app_config().map_err(|e| {
        error!("Failed to load config: {}", e);
        e
    })?;

    // One client for upstream and platform calls
    let http_client = utils::http::create_client_with_proxy(
        config.proxy.request_timeout,
        Some(&config.proxy.upstream_proxy),
    );

    let user_resolver =
        PlatformRegistry::default().get_adapter(&config.platform, http_client.clone())?;
    let upstream = UpstreamClient::new(&config.rewards, http_client)?;
    let state = AppState::new(config.rewards.clone(), upstream, user_resolver);

    let (server, handle) = AxumServer::start(&config, state)
        .await
        .map_err(AppError::Server)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.stop();
    handle
        .await
        .map_err(|e| AppError::Server(format!("Server task failed: {}", e)))?;

    Ok(())
}
