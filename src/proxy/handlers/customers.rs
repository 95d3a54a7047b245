// Customer endpoints: v1 referral helpers and v2 customer records
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use super::resolve_user;
use crate::proxy::errors::ProxyError;
use crate::proxy::mappers::{
    BirthdayRequest, CustomerDetailsQuery, CustomerUpsertRequest, JsonBody, QueryParams,
    ReferralSharesRequest,
};
use crate::proxy::server::AppState;
use crate::proxy::upstream::{ApiVersion, UpstreamRequest};

/// Identify a referrer by email (v1)
pub async fn handle_customer_details(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ProxyError> {
    let query = CustomerDetailsQuery::from_params(&params, &state.rewards.merchant_id)?;

    let request =
        UpstreamRequest::get(ApiVersion::V1, "/customer_details").with_query(query.into_pairs());
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Send the referral share email to a list of addresses (v1)
pub async fn handle_referral_email_shares(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Response, ProxyError> {
    let payload = ReferralSharesRequest::from_body(body, &state.rewards.merchant_id)?;

    let request =
        UpstreamRequest::post(ApiVersion::V1, "/referral_email_shares", &payload)?.lenient();
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Create or update the calling customer
pub async fn handle_upsert_customer(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    JsonBody(body): JsonBody,
) -> Result<Response, ProxyError> {
    let payload = CustomerUpsertRequest::from_body(body)?;
    let user = resolve_user(&state, &params).await?;
    let payload = payload.for_customer(&user);

    tracing::info!("Upserting rewards customer {}", user.id_param());
    let request = UpstreamRequest::post(ApiVersion::V2, "/customers", &payload)?.lenient();
    Ok(state.upstream.forward(request).await?.into_response())
}

pub async fn handle_customer_birthdays(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    JsonBody(body): JsonBody,
) -> Result<Response, ProxyError> {
    let payload = BirthdayRequest::from_body(body)?;
    let user = resolve_user(&state, &params).await?;
    let payload = payload.for_customer(&user);

    let request =
        UpstreamRequest::post(ApiVersion::V2, "/customer_birthdays", &payload)?.lenient();
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Page through all customers; the query (e.g. `last_seen_at`) is passed on as-is
pub async fn handle_list_customers(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ProxyError> {
    let request =
        UpstreamRequest::get(ApiVersion::V2, "/customers/all").with_query(params.into_inner());
    Ok(state.upstream.forward(request).await?.into_response())
}

/// Fetch the calling customer's rewards record
pub async fn handle_get_customer(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ProxyError> {
    let user = resolve_user(&state, &params).await?;

    let request = UpstreamRequest::get(ApiVersion::V2, "/customers")
        .with_query(params.for_customer(&user).into_inner());
    Ok(state.upstream.forward(request).await?.into_response())
}
