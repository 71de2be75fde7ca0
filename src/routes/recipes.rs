// ABOUTME: Recipe route handlers: CRUD, favorites, shopping cart, short links and list download
// ABOUTME: Converts between request/response shapes and RecipeDraft, enforcing author-only writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use foodgram_core::pagination::{Page, PageParams, PageQuery};
use http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    HeaderMap,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::users::{discard_image, user_response, UserResponse};
use super::{parse_flag, parse_id, request_url, ApiJson, ApiQuery};
use crate::auth::AuthResult;
use crate::constants::shopping_list;
use crate::database::RecipeListKind;
use crate::errors::{AppError, AppResult};
use crate::images::{decode_data_uri, ImageStore, RECIPE_IMAGES};
use crate::logging::AppLogger;
use crate::models::{IngredientAmount, Recipe, RecipeDetails, RecipeDraft, RecipeFilter, Tag};
use crate::resources::ServerResources;
use crate::services::{shopping_list as report, short_links};

// ================================================================================================
// Request Types
// ================================================================================================

/// Ingredient reference in a recipe write
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IngredientAmountRequest {
    /// Catalog ingredient id
    pub id: i64,
    /// Amount in the ingredient's unit
    pub amount: i64,
}

impl From<IngredientAmountRequest> for IngredientAmount {
    fn from(request: IngredientAmountRequest) -> Self {
        Self {
            ingredient_id: request.id,
            amount: request.amount,
        }
    }
}

/// Recipe creation request; `image` is a base64 data URI
#[derive(Debug, Default, Deserialize)]
pub struct CreateRecipeRequest {
    /// Ingredient references
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    /// Tag ids
    pub tags: Option<Vec<i64>>,
    /// Image data URI
    pub image: Option<String>,
    /// Title
    pub name: Option<String>,
    /// Description
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i64>,
}

/// Recipe update request; same fields as creation with `image` optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    /// Ingredient references
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    /// Tag ids
    pub tags: Option<Vec<i64>>,
    /// Replacement image data URI
    pub image: Option<String>,
    /// Title
    pub name: Option<String>,
    /// Description
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i64>,
}

/// Fields shared by create and update, with the image handled separately
struct RecipeFields {
    ingredients: Option<Vec<IngredientAmountRequest>>,
    tags: Option<Vec<i64>>,
    name: Option<String>,
    text: Option<String>,
    cooking_time: Option<i64>,
}

impl RecipeFields {
    fn into_draft(self, image: String) -> AppResult<RecipeDraft> {
        Ok(RecipeDraft {
            name: self
                .name
                .map(|n| n.trim().to_owned())
                .ok_or_else(|| AppError::missing_field("name"))?,
            text: self.text.ok_or_else(|| AppError::missing_field("text"))?,
            image,
            cooking_time: self
                .cooking_time
                .ok_or_else(|| AppError::missing_field("cooking_time"))?,
            tags: self.tags.ok_or_else(|| AppError::missing_field("tags"))?,
            ingredients: self
                .ingredients
                .ok_or_else(|| AppError::missing_field("ingredients"))?
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }
}

/// Recipe list query, read as raw pairs so `tags` may repeat
#[derive(Debug, Default)]
struct RecipeListQuery {
    page: PageQuery,
    author: Option<i64>,
    tags: Vec<String>,
    is_favorited: Option<bool>,
    is_in_shopping_cart: Option<bool>,
}

impl RecipeListQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> AppResult<Self> {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page.page = Some(value),
                "limit" => query.page.limit = Some(value),
                "author" => {
                    let author = value.trim().parse::<i64>().map_err(|_| {
                        AppError::invalid_input("Author must be a user id").with_field("author")
                    })?;
                    query.author = Some(author);
                }
                "tags" => {
                    if !value.trim().is_empty() {
                        query.tags.push(value.trim().to_owned());
                    }
                }
                "is_favorited" => query.is_favorited = parse_flag(Some(&value)),
                "is_in_shopping_cart" => query.is_in_shopping_cart = parse_flag(Some(&value)),
                _ => {}
            }
        }
        Ok(query)
    }
}

// ================================================================================================
// Response Types
// ================================================================================================

/// Ingredient line in a recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLineResponse {
    /// Catalog ingredient id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount in the unit
    pub amount: i64,
}

/// Full recipe representation for a viewer
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Recipe id
    pub id: i64,
    /// Attached tags
    pub tags: Vec<Tag>,
    /// Author profile
    pub author: UserResponse,
    /// Ingredient lines
    pub ingredients: Vec<IngredientLineResponse>,
    /// Whether the viewer favorited the recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the viewer's shopping cart
    pub is_in_shopping_cart: bool,
    /// Title
    pub name: String,
    /// Absolute image URL
    pub image: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
}

/// Compact recipe representation used in lists and toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeShortResponse {
    /// Recipe id
    pub id: i64,
    /// Title
    pub name: String,
    /// Absolute image URL
    pub image: String,
    /// Minutes
    pub cooking_time: i64,
}

impl RecipeShortResponse {
    /// Build from a recipe row, resolving its image URL
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, images: &dyn ImageStore) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: images.url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short link response
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    /// Absolute short URL
    #[serde(rename = "short-link")]
    pub short_link: String,
}

async fn recipe_response(
    resources: &ServerResources,
    details: RecipeDetails,
    viewer: Option<i64>,
) -> AppResult<RecipeResponse> {
    let RecipeDetails {
        recipe,
        tags,
        ingredients,
    } = details;

    let author = resources
        .database
        .users()
        .get(recipe.author_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            resources.database.favorites().contains(viewer_id, recipe.id).await?,
            resources
                .database
                .shopping_cart()
                .contains(viewer_id, recipe.id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.id,
        tags,
        author: user_response(resources, author, viewer).await?,
        ingredients: ingredients
            .into_iter()
            .map(|line| IngredientLineResponse {
                id: line.ingredient.id,
                name: line.ingredient.name,
                measurement_unit: line.ingredient.measurement_unit,
                amount: line.amount,
            })
            .collect(),
        is_favorited,
        is_in_shopping_cart,
        image: resources.images.url(&recipe.image),
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

// ================================================================================================
// Routes
// ================================================================================================

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes/",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/download_shopping_cart/",
                get(Self::handle_download_shopping_cart),
            )
            .route(
                "/api/recipes/:id/",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/recipes/:id/get-link/", get(Self::handle_get_link))
            .route(
                "/api/recipes/:id/favorite/",
                post(Self::handle_add_favorite).delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart/",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    /// Handle GET /api/recipes/ - Filtered, paginated recipe list
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        OriginalUri(uri): OriginalUri,
        ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
    ) -> Result<Response, AppError> {
        let viewer = resources.authenticate_optional(&headers).await?;
        let viewer_id = viewer.map(|a| a.user_id);
        let query = RecipeListQuery::from_pairs(pairs)?;

        let params = PageParams::resolve(
            &query.page,
            resources.config.pagination.default_page_size,
            resources.config.pagination.max_page_size,
        );
        let filter = RecipeFilter {
            author: query.author,
            tags: query.tags,
            is_favorited: query.is_favorited,
            is_in_shopping_cart: query.is_in_shopping_cart,
            viewer_id,
        };

        let recipes = resources.database.recipes();
        let (rows, count) = recipes
            .list(&filter, params.sql_limit(), params.sql_offset())
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for recipe in rows {
            let details = RecipeDetails {
                tags: recipes.tags_for(recipe.id).await?,
                ingredients: recipes.ingredients_for(recipe.id).await?,
                recipe,
            };
            results.push(recipe_response(&resources, details, viewer_id).await?);
        }

        let url = request_url(&resources.config.public_base_url, &uri)?;
        let page = Page::new(results, count, params, &url);
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle GET /api/recipes/:id/
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe_id = parse_id(&id, "Recipe")?;
        let viewer = resources.authenticate_optional(&headers).await?;

        let details = resources
            .database
            .recipes()
            .get_details(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        let response = recipe_response(&resources, details, viewer.map(|a| a.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes/ - Create a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(request): ApiJson<CreateRecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;

        let raw_image = request.image.unwrap_or_default();
        let fields = RecipeFields {
            ingredients: request.ingredients,
            tags: request.tags,
            name: request.name,
            text: request.text,
            cooking_time: request.cooking_time,
        };
        let mut draft = fields.into_draft(raw_image)?;
        draft.validate()?;
        let image = decode_data_uri("image", &draft.image)?;

        draft.image = resources.images.store(RECIPE_IMAGES, image).await?;
        let recipe = match resources
            .database
            .recipes()
            .create(auth.user_id, &draft, resources.short_codes.as_ref())
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                discard_image(&resources, Some(&draft.image)).await;
                return Err(e);
            }
        };

        let response = Self::load_response(&resources, recipe.id, Some(auth.user_id)).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PATCH /api/recipes/:id/ - Replace a recipe's content (author only)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(request): ApiJson<UpdateRecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        let existing = Self::owned_recipe(&resources, recipe_id, auth).await?;

        let fields = RecipeFields {
            ingredients: request.ingredients,
            tags: request.tags,
            name: request.name,
            text: request.text,
            cooking_time: request.cooking_time,
        };
        let mut draft = fields.into_draft(existing.image.clone())?;
        draft.validate()?;

        let replacement = match request.image.filter(|i| !i.trim().is_empty()) {
            Some(raw) => {
                let image = decode_data_uri("image", &raw)?;
                Some(resources.images.store(RECIPE_IMAGES, image).await?)
            }
            None => None,
        };
        if let Some(reference) = &replacement {
            draft.image.clone_from(reference);
        }

        if let Err(e) = resources.database.recipes().update(recipe_id, &draft).await {
            discard_image(&resources, replacement.as_deref()).await;
            return Err(e);
        }
        if replacement.is_some() {
            discard_image(&resources, Some(&existing.image)).await;
        }

        let response = Self::load_response(&resources, recipe_id, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/ (author only)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        let existing = Self::owned_recipe(&resources, recipe_id, auth).await?;

        resources.database.recipes().delete(recipe_id).await?;
        discard_image(&resources, Some(&existing.image)).await;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/recipes/:id/get-link/
    async fn handle_get_link(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe_id = parse_id(&id, "Recipe")?;
        let code = resources
            .database
            .recipes()
            .ensure_short_code(recipe_id, resources.short_codes.as_ref())
            .await?;

        AppLogger::log_short_link(recipe_id, &code, "issued");
        let response = ShortLinkResponse {
            short_link: short_links::short_link_url(&resources.config.public_base_url, &code),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes/:id/favorite/
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_to_list(&resources, &headers, &id, RecipeListKind::Favorites).await
    }

    /// Handle DELETE /api/recipes/:id/favorite/
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_from_list(&resources, &headers, &id, RecipeListKind::Favorites).await
    }

    /// Handle POST /api/recipes/:id/shopping_cart/
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_to_list(&resources, &headers, &id, RecipeListKind::ShoppingCart).await
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart/
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_from_list(&resources, &headers, &id, RecipeListKind::ShoppingCart).await
    }

    /// Handle GET /api/recipes/download_shopping_cart/
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let items = resources.database.recipes().shopping_items(auth.user_id).await?;
        let body = report::build_report(&items);

        info!(
            user_id = auth.user_id,
            items = items.len(),
            bytes = body.len(),
            "Shopping list generated"
        );

        Ok((
            StatusCode::OK,
            [
                (CONTENT_TYPE, shopping_list::CONTENT_TYPE.to_owned()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", shopping_list::FILENAME),
                ),
            ],
            body,
        )
            .into_response())
    }

    // ============================================================================================
    // Helpers
    // ============================================================================================

    async fn load_response(
        resources: &ServerResources,
        recipe_id: i64,
        viewer: Option<i64>,
    ) -> AppResult<RecipeResponse> {
        let details = resources
            .database
            .recipes()
            .get_details(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        recipe_response(resources, details, viewer).await
    }

    /// Load a recipe the caller is allowed to modify
    async fn owned_recipe(
        resources: &ServerResources,
        recipe_id: i64,
        auth: AuthResult,
    ) -> AppResult<Recipe> {
        let recipe = resources
            .database
            .recipes()
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        if recipe.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author can modify this recipe",
            ));
        }
        Ok(recipe)
    }

    async fn add_to_list(
        resources: &ServerResources,
        headers: &HeaderMap,
        id: &str,
        kind: RecipeListKind,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(headers).await?;
        let recipe_id = parse_id(id, "Recipe")?;
        let recipe = resources
            .database
            .recipes()
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        resources
            .database
            .recipe_list(kind)
            .add(auth.user_id, recipe_id)
            .await?;

        let response = RecipeShortResponse::from_recipe(&recipe, resources.images.as_ref());
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    async fn remove_from_list(
        resources: &ServerResources,
        headers: &HeaderMap,
        id: &str,
        kind: RecipeListKind,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(headers).await?;
        let recipe_id = parse_id(id, "Recipe")?;
        if resources.database.recipes().get(recipe_id).await?.is_none() {
            return Err(AppError::not_found("Recipe"));
        }

        resources
            .database
            .recipe_list(kind)
            .remove(auth.user_id, recipe_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_list_query_collects_repeated_tags() {
        let query = RecipeListQuery::from_pairs(pairs(&[
            ("tags", "breakfast"),
            ("tags", "lunch"),
            ("is_favorited", "1"),
            ("is_in_shopping_cart", "false"),
            ("page", "2"),
            ("author", "7"),
        ]))
        .unwrap();

        assert_eq!(query.tags, vec!["breakfast", "lunch"]);
        assert_eq!(query.is_favorited, Some(true));
        assert_eq!(query.is_in_shopping_cart, Some(false));
        assert_eq!(query.page.page.as_deref(), Some("2"));
        assert_eq!(query.author, Some(7));
    }

    #[test]
    fn test_list_query_rejects_bad_author() {
        assert!(RecipeListQuery::from_pairs(pairs(&[("author", "bob")])).is_err());
    }

    #[test]
    fn test_missing_fields_reported() {
        let fields = RecipeFields {
            ingredients: None,
            tags: Some(vec![1]),
            name: Some("Soup".into()),
            text: Some("Boil".into()),
            cooking_time: Some(10),
        };
        let err = fields.into_draft("img".into()).unwrap_err();
        assert!(err.message.contains("ingredients"));
    }
}
