// ABOUTME: Application error types re-exported from foodgram-core
// ABOUTME: Single AppError/ErrorCode taxonomy shared by managers and HTTP handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! The error taxonomy lives in `foodgram-core` so that the HTTP mapping
//! (`IntoResponse`) and the `sqlx` conversion are defined next to the codes.

pub use foodgram_core::errors::database::{is_unique_violation, is_unique_violation_on};
pub use foodgram_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
