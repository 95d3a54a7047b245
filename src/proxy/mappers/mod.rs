// Mapper module
// Storefront input -> typed upstream payloads

pub mod payloads;
pub mod query;

pub use payloads::*;
pub use query::{QueryParams, TOKEN_PARAM};
