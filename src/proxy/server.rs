use crate::models::AppConfig;
use crate::proxy::config::RewardsConfig;
use crate::proxy::platform::UserResolver;
use crate::proxy::upstream::UpstreamClient;
use axum::{
    extract::ConnectInfo,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state; immutable for the server lifetime
#[derive(Clone)]
pub struct AppState {
    pub rewards: Arc<RewardsConfig>,
    pub upstream: Arc<UpstreamClient>,
    pub user_resolver: Arc<dyn UserResolver>,
}

impl AppState {
    pub fn new(
        rewards: RewardsConfig,
        upstream: UpstreamClient,
        user_resolver: Arc<dyn UserResolver>,
    ) -> Self {
        Self {
            rewards: Arc::new(rewards),
            upstream: Arc::new(upstream),
            user_resolver,
        }
    }
}

/// Rewards routes under `mount_path`, plus health check and middleware
pub fn build_router(state: AppState, mount_path: &str) -> Router {
    use crate::proxy::handlers;

    let mount_path = mount_path.trim_end_matches('/');
    let rewards = handlers::rewards_routes();
    let routes = if mount_path.is_empty() {
        Router::new().merge(rewards)
    } else {
        Router::new().nest(mount_path, rewards)
    };

    routes
        .route("/healthz", get(health_check_handler))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            crate::proxy::middleware::access_log_middleware,
        ))
        .layer(crate::proxy::middleware::cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        config: &AppConfig,
        state: AppState,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let app = build_router(state, &config.proxy.mount_path);

        // Bind address
        let addr = format!("{}:{}", config.proxy.get_bind_address(), config.proxy.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read local address: {}", e))?;

        tracing::info!(
            "Rewards proxy started at http://{}{}",
            local_addr,
            config.proxy.mount_path
        );

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, peer)) => {
                                let io = TokioIo::new(stream);
                                // Peer address for `ConnectInfo` extraction
                                let app = app.clone().layer(Extension(ConnectInfo(peer)));
                                let service = TowerToHyperService::new(app);

                                // Dropping the connection drops the handler future and
                                // with it any in-flight upstream request
                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Rewards proxy stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
