pub mod body;
pub mod client;

pub use body::{BodyDecodeError, BodyPolicy, UpstreamBody, UpstreamReply};
pub use client::{ApiVersion, UpstreamClient, UpstreamRequest};
