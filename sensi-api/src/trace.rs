//! Per-request trace ids.
//!
//! Every request runs inside a span carrying a trace id. A well-formed
//! `X-Trace-Id` from the caller is reused; otherwise a fresh UUID v4 is
//! generated. The id is echoed back on the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sensi_common::logging::generate_trace_id;
use tracing::Instrument;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 128;

/// Middleware that opens the request span and sets the response header.
pub async fn trace_requests(request: Request, next: Next) -> Response {
    let trace_id = incoming_trace_id(request.headers()).unwrap_or_else(generate_trace_id);

    let span = sensi_common::request_span!(
        "http_request",
        trace_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::debug!(status = response.status().as_u16(), "Request finished");
    });

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

fn incoming_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_TRACE_ID_LEN
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map(String::from)
}
