// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Short code generation and shopping list aggregation, independent of HTTP and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Pure business logic used by the route handlers and database managers.

/// Shopping list aggregation and text rendering
pub mod shopping_list;

/// Short code generation for recipe links
pub mod short_links;
