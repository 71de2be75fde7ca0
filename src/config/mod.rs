// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports environment-driven server, auth, CORS and pagination settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the Foodgram server
//!
//! All settings are read from environment variables at startup; see
//! [`ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseUrl, Environment, LogLevel, PaginationConfig, ServerConfig,
};
