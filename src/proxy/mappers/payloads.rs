// Per-route upstream payloads
//
// Each builder validates the storefront input, strips any client-supplied
// identity fields and exposes the injected fields by name, so enrichment never
// clobbers caller data silently.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::query::QueryParams;
use crate::models::User;
use crate::proxy::errors::ProxyError;

pub type Body = Map<String, Value>;

/// Storefront POST body
///
/// A missing body, an empty one or a non-JSON content type reads as `{}` so the
/// route's own field checks produce the error message.
#[derive(Debug, Clone, Default)]
pub struct JsonBody(pub Body);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ProxyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ProxyError::Validation("Request body could not be read."))?;
        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Body::new()));
        }

        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(Value::Null) | Ok(Value::Array(_)) => Ok(Self(Body::new())),
            _ => Err(ProxyError::Validation("Request body must be a JSON object.")),
        }
    }
}

/// Storefront presence rules: null, false, "", 0 and absence are all missing
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(_) => true,
    }
}

fn take_required(body: &mut Body, key: &str, message: &'static str) -> Result<Value, ProxyError> {
    match body.remove(key) {
        Some(value) if is_present(Some(&value)) => Ok(value),
        _ => Err(ProxyError::Validation(message)),
    }
}

fn strip(body: &mut Body, keys: &[&str]) {
    for key in keys {
        body.remove(*key);
    }
}

// ===== v1 =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetailsQuery {
    pub customer_email: String,
    pub merchant_id: String,
}

impl CustomerDetailsQuery {
    pub fn from_params(params: &QueryParams, merchant_id: &str) -> Result<Self, ProxyError> {
        let customer_email = params
            .get("customer_email")
            .filter(|v| !v.is_empty())
            .ok_or(ProxyError::Validation("Customer Email required."))?;

        Ok(Self {
            customer_email: customer_email.to_string(),
            merchant_id: merchant_id.to_string(),
        })
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        vec![
            ("customer_email".to_string(), self.customer_email),
            ("merchant_id".to_string(), self.merchant_id),
        ]
    }
}

/// Only the listed fields are forwarded; `emails` goes through untouched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralSharesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Value>,
    pub customer_email: Value,
    pub merchant_id: String,
}

impl ReferralSharesRequest {
    pub fn from_body(mut body: Body, merchant_id: &str) -> Result<Self, ProxyError> {
        let customer_email =
            take_required(&mut body, "customer_email", "Customer Email is required.")?;

        Ok(Self {
            emails: body.remove("emails"),
            customer_email,
            merchant_id: merchant_id.to_string(),
        })
    }
}

// ===== v2 =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    #[serde(flatten)]
    pub fields: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl ActionRequest {
    pub fn from_body(mut body: Body) -> Self {
        strip(&mut body, &["customer_email", "customer_id", "ip_address"]);
        Self {
            fields: body,
            customer_email: None,
            customer_id: None,
            ip_address: None,
        }
    }

    pub fn for_customer(self, user: &User, ip_address: Option<String>) -> Self {
        Self {
            customer_email: Some(user.email.clone()),
            customer_id: Some(user.id.clone()),
            ip_address,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerUpsertRequest {
    pub first_name: Value,
    pub last_name: Value,
    #[serde(flatten)]
    pub fields: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerUpsertRequest {
    pub fn from_body(mut body: Body) -> Result<Self, ProxyError> {
        let first_name = take_required(&mut body, "first_name", "First name is required.")?;
        let last_name = take_required(&mut body, "last_name", "Last name is required.")?;
        strip(&mut body, &["id", "email"]);

        Ok(Self {
            first_name,
            last_name,
            fields: body,
            id: None,
            email: None,
        })
    }

    pub fn for_customer(self, user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            email: Some(user.email.clone()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirthdayRequest {
    pub day: Value,
    pub month: Value,
    pub year: Value,
    #[serde(flatten)]
    pub fields: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl BirthdayRequest {
    pub fn from_body(mut body: Body) -> Result<Self, ProxyError> {
        const MISSING: &str = "Date is required.";
        let day = take_required(&mut body, "day", MISSING)?;
        let month = take_required(&mut body, "month", MISSING)?;
        let year = take_required(&mut body, "year", MISSING)?;
        strip(&mut body, &["customer_email"]);

        Ok(Self {
            day,
            month,
            year,
            fields: body,
            customer_email: None,
        })
    }

    pub fn for_customer(self, user: &User) -> Self {
        Self {
            customer_email: Some(user.email.clone()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedemptionRequest {
    pub redemption_option_id: Value,
    #[serde(flatten)]
    pub fields: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_external_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl RedemptionRequest {
    pub fn from_body(mut body: Body) -> Result<Self, ProxyError> {
        let redemption_option_id = take_required(
            &mut body,
            "redemption_option_id",
            "Redemption option ID is required.",
        )?;
        strip(&mut body, &["customer_external_id", "customer_email"]);

        Ok(Self {
            redemption_option_id,
            fields: body,
            customer_external_id: None,
            customer_email: None,
        })
    }

    pub fn for_customer(self, user: &User) -> Self {
        Self {
            customer_external_id: Some(user.id.clone()),
            customer_email: Some(user.email.clone()),
            ..self
        }
    }
}

/// `third_party_id` or `code` must be present; the query is forwarded whole
pub fn check_redemption_code_lookup(params: &QueryParams) -> Result<(), ProxyError> {
    let has = |key: &str| params.get(key).is_some_and(|v| !v.is_empty());
    if has("third_party_id") || has("code") {
        Ok(())
    } else {
        Err(ProxyError::Validation("Third-party Id or Code required."))
    }
}
