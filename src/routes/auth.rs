// ABOUTME: Token authentication route handlers
// ABOUTME: Exchanges email and password for a JWT and acknowledges logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Token to send as `Authorization: Token <auth_token>`
    pub auth_token: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/token/login/", post(Self::handle_login))
            .route("/api/auth/token/logout/", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle POST /api/auth/token/login/
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(request): ApiJson<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(AppError::missing_field("email"));
        }
        if request.password.is_empty() {
            return Err(AppError::missing_field("password"));
        }

        let invalid = || AppError::auth_invalid("Unable to log in with provided credentials");

        let Some(user) = resources.database.users().get_by_email(email).await? else {
            AppLogger::log_auth_event(None, "login", false);
            return Err(invalid());
        };

        if !resources
            .auth_manager
            .verify_password(&request.password, &user.password_hash)
            .await
        {
            AppLogger::log_auth_event(Some(user.id), "login", false);
            return Err(invalid());
        }

        let auth_token = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(Some(user.id), "login", true);

        Ok((StatusCode::OK, Json(LoginResponse { auth_token })).into_response())
    }

    /// Handle POST /api/auth/token/logout/
    ///
    /// Tokens are stateless, so logout only confirms the caller was
    /// authenticated; the client discards its token.
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticate(&headers).await?;
        AppLogger::log_auth_event(Some(auth.user_id), "logout", true);
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
