pub mod config;
pub mod user;

pub use config::{AppConfig, PlatformConfig};
pub use user::User;
