//! HTTP middleware

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Request logging middleware
///
/// Opens an `http_request` span per request and records status code, latency
/// and response size on completion. Server errors log at `warn`.
pub async fn logging_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        status_code = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let start_time = Instant::now();
    span.in_scope(|| tracing::debug!("Processing request"));
    let response = next.run(request).await;

    let latency_ms = start_time.elapsed().as_millis() as u64;
    let status_code = response.status();
    let response_size = response
        .headers()
        .get("content-length")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    span.record("status_code", status_code.as_u16());
    span.record("latency_ms", latency_ms);

    let _guard = span.enter();
    if status_code.is_server_error() {
        tracing::warn!(response_size, "Request failed");
    } else {
        tracing::info!(response_size, "Request completed");
    }

    Ok(response)
}
