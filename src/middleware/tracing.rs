// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Builds per-request spans keyed by x-request-id and records status and latency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use http::{header::HeaderName, Request, Response};
use tracing::{field, Span};

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Create a tracing span for an HTTP request
///
/// Expects the request id header to be set already (see `SetRequestIdLayer`).
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        status_code = field::Empty,
        duration_ms = field::Empty,
    )
}

/// Record the response status and latency on the request span
pub fn record_response<B>(response: &Response<B>, latency: Duration, span: &Span) {
    let duration_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    span.record("status_code", response.status().as_u16());
    span.record("duration_ms", duration_ms);

    if response.status().is_server_error() {
        tracing::warn!(parent: span, status = response.status().as_u16(), duration_ms, "Request failed");
    } else {
        tracing::debug!(parent: span, status = response.status().as_u16(), duration_ms, "Request completed");
    }
}
