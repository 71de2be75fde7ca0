// ABOUTME: Route module organization for Foodgram HTTP endpoints
// ABOUTME: Provides per-domain routers and the small helpers their handlers share
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the Foodgram server
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the database managers and services. Handlers receive the
//! caller identity explicitly through [`crate::resources::ServerResources`].

/// Token login and logout routes
pub mod auth;
/// Read-only tag and ingredient routes
pub mod catalog;
/// Health check routes
pub mod health;
/// Recipe CRUD, favorites, shopping cart and short link routes
pub mod recipes;
/// Short link redirect routes
pub mod short_links;
/// User registration, profile, avatar and subscription routes
pub mod users;

pub use auth::{AuthRoutes, LoginRequest, LoginResponse};
pub use catalog::CatalogRoutes;
pub use health::HealthRoutes;
pub use recipes::{
    CreateRecipeRequest, RecipeResponse, RecipeRoutes, RecipeShortResponse, UpdateRecipeRequest,
};
pub use short_links::ShortLinkRoutes;
pub use users::{SubscriptionResponse, UserResponse, UserRoutes};

use axum::extract::{FromRequest, FromRequestParts};
use http::Uri;
use url::Url;

use crate::errors::{AppError, AppResult};

/// JSON body extractor whose rejections use the structured error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the structured error body
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Parse a numeric path id; anything else is treated as an unknown resource
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::not_found(resource))
}

/// Absolute URL of the current request, used for pagination links
pub(crate) fn request_url(public_base_url: &str, uri: &Uri) -> AppResult<Url> {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Url::parse(&format!("{public_base_url}{path_and_query}"))
        .map_err(|e| AppError::internal(format!("Failed to build request URL: {e}")))
}

/// Interpret a boolean query flag: `1`/`true` and `0`/`false`
///
/// Unrecognized values yield `None` and leave the filter unapplied.
pub(crate) fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12", "Recipe").unwrap(), 12);
        assert!(parse_id("abc", "Recipe").is_err());
        assert!(parse_id("0", "Recipe").is_err());
        assert!(parse_id("-3", "Recipe").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(Some("1")), Some(true));
        assert_eq!(parse_flag(Some("True")), Some(true));
        assert_eq!(parse_flag(Some("0")), Some(false));
        assert_eq!(parse_flag(Some("false")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn test_request_url_keeps_query() {
        let uri: Uri = "/api/recipes/?tags=lunch&page=2".parse().unwrap();
        let url = request_url("http://testserver", &uri).unwrap();
        assert_eq!(url.as_str(), "http://testserver/api/recipes/?tags=lunch&page=2");
    }
}
