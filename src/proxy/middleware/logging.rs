use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Access log; also tags request and response with `x-request-id`
pub async fn access_log_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let request_id = match request.headers().get(&REQUEST_ID) {
        Some(id) => id.clone(),
        None => {
            let generated = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(REQUEST_ID.clone(), generated.clone());
            generated
        }
    };

    let mut response = next.run(request).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "[Access] {} {} {} {}ms id={}",
        method,
        path,
        status,
        duration_ms,
        request_id.to_str().unwrap_or("-")
    );

    response.headers_mut().insert(REQUEST_ID.clone(), request_id);
    response
}
