// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request span creation and CORS layer configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS configuration
pub mod cors;
/// Request spans and response recording
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::{make_request_span, record_response, REQUEST_ID_HEADER};
