//! Request correlation and access logging middleware.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id of the current request, available as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuses the caller's `X-Request-ID` or assigns a fresh UUID, echoes it on
/// the response and writes one access log line per request.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = HeaderValue::from_str(&request_id)
        .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
    request.headers_mut().insert(X_REQUEST_ID.clone(), header.clone());
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    response.headers_mut().insert(X_REQUEST_ID.clone(), header);

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        request_id = %request_id,
        "HTTP request"
    );

    response
}
