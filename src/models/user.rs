use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storefront customer resolved from a bearer token
///
/// `id` keeps the platform's JSON type (Magento ids are numbers) so payloads
/// carry it upstream unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Value,
    pub email: String,
}

impl User {
    /// Build from a platform customer record
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = match record.get("id")? {
            Value::String(s) if !s.is_empty() => Value::String(s.clone()),
            Value::Number(n) => Value::Number(n.clone()),
            _ => return None,
        };
        let email = record.get("email")?.as_str()?.to_string();

        Some(Self { id, email })
    }

    /// Id as a query string value
    pub fn id_param(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
