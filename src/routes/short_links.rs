// ABOUTME: Short link redirect route handlers
// ABOUTME: Resolves a short code to its recipe and redirects to the recipe page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::header::LOCATION;

use crate::constants::{endpoints, short_links::REDIRECT_PREFIX};
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::services::short_links::{is_well_formed, recipe_page_url};

/// Short link redirect routes
pub struct ShortLinkRoutes;

impl ShortLinkRoutes {
    /// Create redirect routes, with and without trailing slash, at the root and under `/api`
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let bare = format!("{REDIRECT_PREFIX}/:code");
        let api = format!("{}{REDIRECT_PREFIX}/:code", endpoints::API_BASE);

        Router::new()
            .route(&bare, get(Self::handle_redirect))
            .route(&format!("{bare}/"), get(Self::handle_redirect))
            .route(&api, get(Self::handle_redirect))
            .route(&format!("{api}/"), get(Self::handle_redirect))
            .with_state(resources)
    }

    /// Handle GET /s/:code/ - 302 to the recipe page
    async fn handle_redirect(
        State(resources): State<Arc<ServerResources>>,
        Path(code): Path<String>,
    ) -> Result<Response, AppError> {
        if !is_well_formed(&code) {
            return Err(AppError::not_found("Short link"));
        }

        let recipe_id = resources
            .database
            .recipes()
            .find_by_short_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link"))?;

        AppLogger::log_short_link(recipe_id, &code, "resolved");
        let location = recipe_page_url(&resources.config.public_base_url, recipe_id);
        Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
    }
}
