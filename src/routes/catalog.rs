// ABOUTME: Read-only catalog route handlers for tags and ingredients
// ABOUTME: Lists tags and supports case-insensitive prefix search over ingredient names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{parse_id, ApiQuery};
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Query parameters for ingredient search
#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearchQuery {
    /// Name prefix, matched case-insensitively
    pub name: Option<String>,
}

/// Catalog routes
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags/", get(Self::handle_list_tags))
            .route("/api/tags/:id/", get(Self::handle_get_tag))
            .route("/api/ingredients/", get(Self::handle_search_ingredients))
            .route("/api/ingredients/:id/", get(Self::handle_get_ingredient))
            .with_state(resources)
    }

    /// Handle GET /api/tags/
    async fn handle_list_tags(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let tags = resources.database.catalog().list_tags().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    /// Handle GET /api/tags/:id/
    async fn handle_get_tag(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "Tag")?;
        let tag = resources
            .database
            .catalog()
            .get_tag(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag"))?;
        Ok((StatusCode::OK, Json(tag)).into_response())
    }

    /// Handle GET /api/ingredients/?name=
    async fn handle_search_ingredients(
        State(resources): State<Arc<ServerResources>>,
        ApiQuery(query): ApiQuery<IngredientSearchQuery>,
    ) -> Result<Response, AppError> {
        let prefix = query.name.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let ingredients = resources.database.catalog().search_ingredients(prefix).await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    /// Handle GET /api/ingredients/:id/
    async fn handle_get_ingredient(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "Ingredient")?;
        let ingredient = resources
            .database
            .catalog()
            .get_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ingredient"))?;
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }
}
