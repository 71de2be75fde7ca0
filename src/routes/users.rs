// ABOUTME: User route handlers for registration, profiles, avatars and subscriptions
// ABOUTME: Builds viewer-aware user representations and followed-author listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use foodgram_core::pagination::{Page, PageParams, PageQuery};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::recipes::RecipeShortResponse;
use super::{parse_id, request_url, ApiJson, ApiQuery};
use crate::errors::{AppError, AppResult};
use crate::images::{decode_data_uri, AVATARS};
use crate::models::user::validate_password;
use crate::models::{NewUser, User};
use crate::resources::ServerResources;

// ================================================================================================
// Request / Response Types
// ================================================================================================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plain-text password
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        Self {
            email: request.email.trim().to_owned(),
            username: request.username.trim().to_owned(),
            first_name: request.first_name.trim().to_owned(),
            last_name: request.last_name.trim().to_owned(),
            password: request.password,
        }
    }
}

/// Registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Login email
    pub email: String,
    /// New user id
    pub id: i64,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// User as seen by a (possibly anonymous) viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Login email
    pub email: String,
    /// User id
    pub id: i64,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the viewer follows this user
    pub is_subscribed: bool,
    /// Absolute avatar URL
    pub avatar: Option<String>,
}

/// Followed author with a preview of their recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    /// Author profile
    #[serde(flatten)]
    pub user: UserResponse,
    /// Author's recipes, possibly truncated by `recipes_limit`
    pub recipes: Vec<RecipeShortResponse>,
    /// Total number of recipes by the author
    pub recipes_count: u64,
}

/// Avatar upload request
#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    /// `data:image/...;base64,...` payload
    pub avatar: Option<String>,
}

/// Avatar upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarResponse {
    /// Absolute avatar URL
    pub avatar: String,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// Replacement password
    pub new_password: String,
    /// Password currently in use
    pub current_password: String,
}

/// Query parameters for the subscriptions listing
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
    /// Maximum number of recipes shown per author
    pub recipes_limit: Option<String>,
}

/// Query parameters for subscribe actions
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    /// Maximum number of recipes shown in the response
    pub recipes_limit: Option<String>,
}

/// Parse `recipes_limit`; values that are not non-negative integers are ignored
fn parse_recipes_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|limit| *limit >= 0)
}

// ================================================================================================
// Representation builders
// ================================================================================================

/// Build the viewer-aware representation of a user
pub(crate) async fn user_response(
    resources: &ServerResources,
    user: User,
    viewer: Option<i64>,
) -> AppResult<UserResponse> {
    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != user.id => {
            resources
                .database
                .subscriptions()
                .is_subscribed(viewer_id, user.id)
                .await?
        }
        _ => false,
    };

    Ok(UserResponse {
        avatar: user.avatar.as_deref().map(|a| resources.images.url(a)),
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

async fn subscription_response(
    resources: &ServerResources,
    author: User,
    viewer_id: i64,
    recipes_limit: Option<i64>,
) -> AppResult<SubscriptionResponse> {
    let recipes = resources.database.recipes();
    let preview = recipes.list_by_author(author.id, recipes_limit).await?;
    let recipes_count = recipes.count_by_author(author.id).await?;

    Ok(SubscriptionResponse {
        recipes: preview
            .iter()
            .map(|r| RecipeShortResponse::from_recipe(r, resources.images.as_ref()))
            .collect(),
        recipes_count,
        user: user_response(resources, author, Some(viewer_id)).await?,
    })
}

// ================================================================================================
// Routes
// ================================================================================================

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/users/",
                get(Self::handle_list).post(Self::handle_register),
            )
            .route("/api/users/me/", get(Self::handle_me))
            .route(
                "/api/users/me/avatar/",
                put(Self::handle_set_avatar).delete(Self::handle_delete_avatar),
            )
            .route("/api/users/set_password/", post(Self::handle_set_password))
            .route("/api/users/subscriptions/", get(Self::handle_subscriptions))
            .route("/api/users/:id/", get(Self::handle_get))
            .route(
                "/api/users/:id/subscribe/",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(resources)
    }

    /// Handle POST /api/users/ - Register a new user
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(request): ApiJson<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let new_user: NewUser = request.into();
        new_user.validate()?;

        let password_hash = resources.auth_manager.hash_password(&new_user.password).await?;
        let user = resources.database.users().create(&new_user, &password_hash).await?;

        let response: RegisterResponse = user.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/users/ - Paginated user directory
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        OriginalUri(uri): OriginalUri,
        ApiQuery(query): ApiQuery<PageQuery>,
    ) -> Result<Response, AppError> {
        let viewer = resources.authenticate_optional(&headers).await?;
        let params = PageParams::resolve(
            &query,
            resources.config.pagination.default_page_size,
            resources.config.pagination.max_page_size,
        );

        let (users, count) = resources
            .database
            .users()
            .list(params.sql_limit(), params.sql_offset())
            .await?;

        let mut results = Vec::with_capacity(users.len());
        for user in users {
            results.push(user_response(&resources, user, viewer.map(|a| a.user_id)).await?);
        }

        let url = request_url(&resources.config.public_base_url, &uri)?;
        let page = Page::new(results, count, params, &url);
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle GET /api/users/:id/
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "User")?;
        let viewer = resources.authenticate_optional(&headers).await?;

        let user = resources
            .database
            .users()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let response = user_response(&resources, user, viewer.map(|a| a.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/me/
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let user = resources
            .database
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let response = user_response(&resources, user, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/users/me/avatar/
    async fn handle_set_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(request): ApiJson<AvatarRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let raw = request
            .avatar
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| AppError::missing_field("avatar"))?;
        let image = decode_data_uri("avatar", &raw)?;

        let users = resources.database.users();
        let previous = users
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?
            .avatar;

        let reference = resources.images.store(AVATARS, image).await?;
        users.set_avatar(auth.user_id, Some(&reference)).await?;
        discard_image(&resources, previous.as_deref()).await;

        info!(user_id = auth.user_id, "Avatar updated");
        let response = AvatarResponse {
            avatar: resources.images.url(&reference),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/users/me/avatar/
    async fn handle_delete_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let users = resources.database.users();
        let previous = users
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?
            .avatar;

        users.set_avatar(auth.user_id, None).await?;
        discard_image(&resources, previous.as_deref()).await;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/users/set_password/
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(request): ApiJson<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        if request.current_password.is_empty() {
            return Err(AppError::missing_field("current_password"));
        }
        validate_password(&request.new_password)
            .map_err(|e| e.with_field("new_password"))?;

        let user = resources
            .database
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !resources
            .auth_manager
            .verify_password(&request.current_password, &user.password_hash)
            .await
        {
            return Err(AppError::invalid_input("Current password is incorrect")
                .with_field("current_password"));
        }

        let hash = resources.auth_manager.hash_password(&request.new_password).await?;
        resources
            .database
            .users()
            .set_password_hash(auth.user_id, &hash)
            .await?;

        info!(user_id = auth.user_id, "Password changed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/subscriptions/
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        OriginalUri(uri): OriginalUri,
        ApiQuery(query): ApiQuery<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let page_query = PageQuery {
            page: query.page,
            limit: query.limit,
        };
        let params = PageParams::resolve(
            &page_query,
            resources.config.pagination.default_page_size,
            resources.config.pagination.max_page_size,
        );
        let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

        let (authors, count) = resources
            .database
            .subscriptions()
            .list_authors(auth.user_id, params.sql_limit(), params.sql_offset())
            .await?;

        let mut results = Vec::with_capacity(authors.len());
        for author in authors {
            results.push(
                subscription_response(&resources, author, auth.user_id, recipes_limit).await?,
            );
        }

        let url = request_url(&resources.config.public_base_url, &uri)?;
        let page = Page::new(results, count, params, &url);
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe/
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiQuery(query): ApiQuery<SubscribeQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let author_id = parse_id(&id, "User")?;
        let author = resources
            .database
            .users()
            .get(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        resources
            .database
            .subscriptions()
            .subscribe(auth.user_id, author_id)
            .await?;

        let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());
        let response =
            subscription_response(&resources, author, auth.user_id, recipes_limit).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe/
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        let author_id = parse_id(&id, "User")?;
        if resources.database.users().get(author_id).await?.is_none() {
            return Err(AppError::not_found("User"));
        }

        resources
            .database
            .subscriptions()
            .unsubscribe(auth.user_id, author_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// Remove a replaced image; failures are logged, the new state is already saved
pub(crate) async fn discard_image(resources: &ServerResources, reference: Option<&str>) {
    if let Some(reference) = reference {
        if let Err(e) = resources.images.delete(reference).await {
            warn!(reference = %reference, "Failed to remove replaced image: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipes_limit() {
        assert_eq!(parse_recipes_limit(Some("3")), Some(3));
        assert_eq!(parse_recipes_limit(Some("0")), Some(0));
        assert_eq!(parse_recipes_limit(Some("-1")), None);
        assert_eq!(parse_recipes_limit(Some("lots")), None);
        assert_eq!(parse_recipes_limit(None), None);
    }
}
