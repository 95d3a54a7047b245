// proxy module - Swell Rewards proxy service

pub mod config;
pub mod errors;
pub mod server;

pub mod handlers; // Rewards endpoint handlers
pub mod mappers; // Storefront input -> upstream payloads
pub mod middleware; // Axum middleware
pub mod platform; // Customer resolution adapters
pub mod upstream; // Upstream client

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ProxyConfig, RewardsConfig};
pub use server::{AppState, AxumServer};
