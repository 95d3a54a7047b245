// Query string handling
use serde::Deserialize;

use crate::models::User;

/// The storefront token travels in the query string of every call
pub const TOKEN_PARAM: &str = "token";

/// Query parameters in arrival order, repeats kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Any non-empty value counts, "0" and "false" included
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn token(&self) -> &str {
        self.get(TOKEN_PARAM).unwrap_or_default()
    }

    pub fn without(mut self, keys: &[&str]) -> Self {
        self.0.retain(|(k, _)| !keys.contains(&k.as_str()));
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    /// Drop the storefront token and attach the resolved customer
    pub fn for_customer(self, user: &User) -> Self {
        self.without(&[TOKEN_PARAM, "customer_id", "customer_email"])
            .with("customer_id", user.id_param())
            .with("customer_email", user.email.clone())
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}
