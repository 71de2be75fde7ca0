// ABOUTME: Axum IntoResponse implementation for AppError
// ABOUTME: Maps error codes to HTTP statuses and converts extractor rejections into client errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use super::{AppError, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_client_error() {
            tracing::debug!(code = ?self.code, status = status.as_u16(), "{}", self.message);
        } else {
            tracing::error!(
                code = ?self.code,
                status = status.as_u16(),
                source = ?self.source,
                "{}",
                self.message
            );
        }

        let mut body = ErrorResponse::from(&self);
        if !self.code.is_client_error() {
            // Server-side messages may carry SQL or filesystem paths
            body.error.message = self.code.description().to_owned();
            body.error.details = None;
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}
