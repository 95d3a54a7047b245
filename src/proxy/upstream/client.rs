// Upstream client for the Swell Rewards API
//
// v1 endpoints are keyed by merchant id and take no credentials; v2 endpoints
// require both `x-guid` and `x-api-key` on every call.

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method,
};
use serde::Serialize;
use serde_json::Value;

use super::body::{BodyPolicy, UpstreamBody, UpstreamReply};
use crate::error::{AppError, AppResult};
use crate::proxy::config::RewardsConfig;
use crate::proxy::errors::ProxyError;

const GUID_HEADER: &str = "x-guid";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

/// One outbound call, built per inbound request
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub version: ApiVersion,
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub policy: BodyPolicy,
}

impl UpstreamRequest {
    pub fn get(version: ApiVersion, path: &'static str) -> Self {
        Self {
            version,
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
            policy: BodyPolicy::Strict,
        }
    }

    pub fn post<T: Serialize>(
        version: ApiVersion,
        path: &'static str,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            version,
            method: Method::POST,
            path,
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
            policy: BodyPolicy::Strict,
        })
    }

    pub fn with_query<I>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.query.extend(query);
        self
    }

    /// Relay non-JSON bodies as strings instead of failing
    pub fn lenient(mut self) -> Self {
        self.policy = BodyPolicy::Lenient;
        self
    }
}

pub struct UpstreamClient {
    http_client: Client,
    v1_base: String,
    v2_base: String,
    credentials: HeaderMap,
}

impl UpstreamClient {
    pub fn new(config: &RewardsConfig, http_client: Client) -> AppResult<Self> {
        let mut credentials = HeaderMap::new();
        credentials.insert(
            HeaderName::from_static(GUID_HEADER),
            sensitive_value(GUID_HEADER, &config.guid)?,
        );
        credentials.insert(
            HeaderName::from_static(API_KEY_HEADER),
            sensitive_value(API_KEY_HEADER, &config.api_key)?,
        );

        Ok(Self {
            http_client,
            v1_base: config.api_url.v1.trim_end_matches('/').to_string(),
            v2_base: config.api_url.v2.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn build_url(&self, version: ApiVersion, path: &str) -> String {
        let base = match version {
            ApiVersion::V1 => &self.v1_base,
            ApiVersion::V2 => &self.v2_base,
        };
        format!("{}{}", base, path)
    }

    fn credential_headers(&self, version: ApiVersion) -> HeaderMap {
        match version {
            ApiVersion::V1 => HeaderMap::new(),
            ApiVersion::V2 => self.credentials.clone(),
        }
    }

    /// Issue a single attempt and decode the reply
    ///
    /// Non-2xx statuses are not errors here; they are relayed as-is.
    pub async fn forward(&self, request: UpstreamRequest) -> Result<UpstreamReply, ProxyError> {
        let url = self.build_url(request.version, request.path);
        tracing::debug!("Forwarding {} {}", request.method, url);

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .headers(self.credential_headers(request.version));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes: Bytes = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!("Upstream {} {} returned {}", request.method, url, status);
        }

        let body = UpstreamBody::decode(&bytes, request.policy)?;
        Ok(UpstreamReply { status, body })
    }
}

fn sensitive_value(name: &str, value: &str) -> AppResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| AppError::Config(format!("{} contains characters not allowed in a header", name)))?;
    header.set_sensitive(true);
    Ok(header)
}
