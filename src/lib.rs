// ABOUTME: Main library entry point for the Foodgram recipe sharing API
// ABOUTME: Exposes configuration, persistence, services and HTTP routes to binaries and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Foodgram Server
//!
//! Backend for a recipe sharing site. Users publish recipes built from a
//! shared ingredient catalog, follow authors, keep favorites, and collect
//! recipes in a shopping cart that can be downloaded as an aggregated
//! shopping list. Every recipe gets a short code that redirects to its page.
//!
//! ## Architecture
//!
//! - **Routes**: axum routers per domain with thin handlers
//! - **Database**: `SQLite` managers per domain over one `sqlx` pool
//! - **Services**: short code generation and shopping list aggregation
//! - **Images**: base64 data URI decoding and a pluggable image store
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use foodgram_server::config::ServerConfig;
//! use foodgram_server::database::Database;
//! use foodgram_server::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database_url).await?;
//!     let resources = Arc::new(ServerResources::new(config, database));
//!     foodgram_server::server::run_server(resources).await
//! }
//! ```

/// JWT authentication and password hashing
pub mod auth;

/// Environment-based configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Error types
pub mod errors;

/// Image decoding and storage
pub mod images;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Domain models
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Short links and shopping lists
pub mod services;
