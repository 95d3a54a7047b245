// Rewards endpoints: actions, redemptions, campaigns and tiers (all v2)
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use super::{client_ip, resolve_user};
use crate::proxy::errors::ProxyError;
use crate::proxy::mappers::{
    check_redemption_code_lookup, ActionRequest, JsonBody, QueryParams, RedemptionRequest,
};
use crate::proxy::server::AppState;
use crate::proxy::upstream::{ApiVersion, UpstreamRequest};

/// Record a customer action (purchase, signup, ...)
pub async fn handle_actions(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> Result<Response, ProxyError> {
    let payload = ActionRequest::from_body(body);
    let user = resolve_user(&state, &params).await?;
    let payload = payload.for_customer(&user, client_ip(&headers, connect_info));

    tracing::info!("Recording action for customer {}", user.id_param());
    let request = UpstreamRequest::post(ApiVersion::V2, "/actions", &payload)?;
    Ok(state.upstream.forward(request).await?.into_response())
}

pub async fn handle_redemptions(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    JsonBody(body): JsonBody,
) -> Result<Response, ProxyError> {
    let payload = RedemptionRequest::from_body(body)?;
    let user = resolve_user(&state, &params).await?;
    let payload = payload.for_customer(&user);

    tracing::info!(
        "Redeeming option {} for customer {}",
        payload.redemption_option_id,
        user.id_param()
    );
    let request = UpstreamRequest::post(ApiVersion::V2, "/redemptions", &payload)?;
    Ok(state.upstream.forward(request).await?.into_response())
}

pub async fn handle_redemption_options(
    State(state): State<AppState>,
) -> Result<Response, ProxyError> {
    let request = UpstreamRequest::get(ApiVersion::V2, "/redemption_options");
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Look up a redemption code by `third_party_id` or `code`
pub async fn handle_redemption_codes(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ProxyError> {
    check_redemption_code_lookup(&params)?;

    let request =
        UpstreamRequest::get(ApiVersion::V2, "/redemption_codes").with_query(params.into_inner());
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Active campaigns; with `with_status` set, per-customer completion is included
pub async fn handle_campaigns(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ProxyError> {
    let params = if params.is_set("with_status") {
        let user = resolve_user(&state, &params).await?;
        params.for_customer(&user)
    } else {
        params
    };

    let request =
        UpstreamRequest::get(ApiVersion::V2, "/campaigns").with_query(params.into_inner());
    Ok(state.upstream.forward(request).await?.into_response())
}

pub async fn handle_vip_tiers(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let request = UpstreamRequest::get(ApiVersion::V2, "/vip_tiers");
    Ok(state.upstream.forward(request).await?.into_response())
}

#[cfg(test)]
mod tests {
    use crate::proxy::test_support::{
        get, post_empty, post_json, send, test_app, StubResolver, MOUNT,
    };
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use std::net::SocketAddr;
    use wiremock::matchers::{any, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn untouched_upstream() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_actions_forwarded_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/actions"))
            .and(header("x-guid", "guid-1"))
            .and(header("x-api-key", "key-1"))
            .and(body_json(json!({
                "type": "purchase",
                "customer_email": "a@x.com",
                "customer_id": "u1",
                "ip_address": "198.51.100.4"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = post_json("/actions?token=t", json!({"type": "purchase"}));
        request
            .extensions_mut()
            .insert(ConnectInfo("198.51.100.4:40000".parse::<SocketAddr>().unwrap()));

        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_actions_resolver_failure_skips_upstream() {
        let server = untouched_upstream().await;
        let resolver = StubResolver::failing(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Token expired"}),
        );

        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, post_json("/actions?token=t", json!({"type": "purchase"}))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Token expired"}));
    }

    #[tokio::test]
    async fn test_actions_without_body_still_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/actions"))
            .and(body_json(json!({
                "customer_email": "a@x.com",
                "customer_id": "u1",
                "ip_address": "198.51.100.4"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = post_empty("/actions?token=t");
        request
            .extensions_mut()
            .insert(ConnectInfo("198.51.100.4:40000".parse::<SocketAddr>().unwrap()));

        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_redemption_without_body_is_validation_error() {
        let server = untouched_upstream().await;
        let resolver = StubResolver::user("u1", "a@x.com");

        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, post_empty("/redemptions?token=t")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Redemption option ID is required."}));
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_redemption_resolver_failure_skips_upstream() {
        let server = untouched_upstream().await;
        let resolver = StubResolver::failing(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Token expired"}),
        );

        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(
            app,
            post_json("/redemptions?token=t", json!({"redemption_option_id": 9})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Token expired"}));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_redemption_validation_and_enrichment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/redemptions"))
            .and(body_json(json!({
                "redemption_option_id": 9,
                "customer_external_id": "u1",
                "customer_email": "a@x.com"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "SAVE10"})))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = StubResolver::user("u1", "a@x.com");
        let (status, body) = send(
            test_app(&server.uri(), resolver.clone()),
            post_json("/redemptions?token=t", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Redemption option ID is required."}));
        assert_eq!(resolver.calls(), 0);

        let (status, body) = send(
            test_app(&server.uri(), resolver.clone()),
            post_json("/redemptions?token=t", json!({"redemption_option_id": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"code": "SAVE10"}));
    }

    #[tokio::test]
    async fn test_redemption_codes_requires_lookup_key() {
        let server = untouched_upstream().await;
        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, get("/redemption_codes?foo=bar")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Third-party Id or Code required."}));
    }

    #[tokio::test]
    async fn test_redemption_codes_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/redemption_codes"))
            .and(query_param("code", "ABC"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, get("/redemption_codes?code=ABC")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "not found"}));
    }

    #[tokio::test]
    async fn test_campaigns_without_status_skips_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = StubResolver::user("u1", "a@x.com");
        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, get("/campaigns")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1}]));
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_campaigns_with_status_adds_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/campaigns"))
            .and(query_param("with_status", "1"))
            .and(query_param("customer_id", "u1"))
            .and(query_param("customer_email", "a@x.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "completed": true}])))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = StubResolver::user("u1", "a@x.com");
        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, get("/campaigns?with_status=1&token=t")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1, "completed": true}]));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_campaigns_with_status_zero_still_adds_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/campaigns"))
            .and(query_param("with_status", "0"))
            .and(query_param("customer_id", "u1"))
            .and(query_param("customer_email", "a@x.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = StubResolver::user("u1", "a@x.com");
        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, get("/campaigns?with_status=0&token=t")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1}]));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_campaigns_resolver_failure_skips_upstream() {
        let server = untouched_upstream().await;
        let resolver = StubResolver::failing(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Token expired"}),
        );

        let app = test_app(&server.uri(), resolver.clone());
        let (status, body) = send(app, get("/campaigns?with_status=1&token=t")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Token expired"}));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_string_body_relayed_as_object() {
        let server = MockServer::start().await;
        let encoded = serde_json::to_string(&json!(r#"{"tiers":[{"name":"Gold"}]}"#)).unwrap();
        Mock::given(method("GET"))
            .and(path("/api/v2/vip_tiers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(encoded))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, get("/vip_tiers")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"tiers": [{"name": "Gold"}]}));
    }

    #[tokio::test]
    async fn test_malformed_upstream_body_is_502() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), StubResolver::user("u1", "a@x.com"));
        let (status, body) = send(app, get("/redemption_options")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["body"], "<html>maintenance</html>");
    }

    #[tokio::test]
    async fn test_transport_failure_is_500() {
        let app = test_app("http://127.0.0.1:1", StubResolver::user("u1", "a@x.com"));
        let request = Request::builder()
            .uri(format!("{}/vip_tiers", MOUNT))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "connect");
        assert!(body["message"].as_str().unwrap().contains("error sending request"));
    }
}
