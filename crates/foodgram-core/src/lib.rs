// ABOUTME: Core types and constants for the Foodgram recipe-sharing server
// ABOUTME: Foundation crate with error handling, pagination, and domain limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Foodgram Core
//!
//! Foundation crate providing shared types and constants for the Foodgram
//! server. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Field limits, short-link parameters and defaults
//! - **pagination**: Page-number pagination envelopes

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Page-number pagination for list endpoints
pub mod pagination;
