// Rewards endpoint handlers
//
// Every handler validates first, resolves the customer only when the route
// needs it, then forwards once and relays whatever came back.

pub mod customers;
pub mod rewards;

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::HeaderMap,
    routing::{get, post},
    Router,
};

use crate::models::User;
use crate::proxy::errors::ProxyError;
use crate::proxy::mappers::QueryParams;
use crate::proxy::server::AppState;

pub fn rewards_routes() -> Router<AppState> {
    Router::new()
        // v1
        .route("/customer_details", get(customers::handle_customer_details))
        .route(
            "/referral_email_shares",
            post(customers::handle_referral_email_shares),
        )
        // v2
        .route("/actions", post(rewards::handle_actions))
        .route(
            "/customers",
            get(customers::handle_get_customer).post(customers::handle_upsert_customer),
        )
        .route("/customers/all", get(customers::handle_list_customers))
        .route(
            "/customer_birthdays",
            post(customers::handle_customer_birthdays),
        )
        .route("/redemptions", post(rewards::handle_redemptions))
        .route("/redemption_options", get(rewards::handle_redemption_options))
        .route("/redemption_codes", get(rewards::handle_redemption_codes))
        .route("/campaigns", get(rewards::handle_campaigns))
        .route("/vip_tiers", get(rewards::handle_vip_tiers))
}

/// Resolve the caller from the `token` query parameter
pub(crate) async fn resolve_user(state: &AppState, params: &QueryParams) -> Result<User, ProxyError> {
    let user = state.user_resolver.resolve_user(params.token()).await?;
    tracing::debug!("Resolved customer {}", user.id_param());
    Ok(user)
}

/// First `X-Forwarded-For` hop, else the peer address
pub(crate) fn client_ip(
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
}
