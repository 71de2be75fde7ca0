// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Bundles configuration, database, auth manager, image store and short code generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use http::HeaderMap;

use crate::auth::{extract_token, AuthManager, AuthResult};
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::images::{ImageStore, LocalImageStore};
use crate::services::short_links::{RandomShortCodeGenerator, ShortCodeGenerator};

/// Long-lived dependencies shared across requests
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Database handle
    pub database: Database,
    /// Token and password handling
    pub auth_manager: AuthManager,
    /// Image persistence
    pub images: Arc<dyn ImageStore>,
    /// Source of recipe short codes
    pub short_codes: Arc<dyn ShortCodeGenerator>,
}

impl ServerResources {
    /// Assemble resources with the filesystem image store and random short codes
    #[must_use]
    pub fn new(config: ServerConfig, database: Database) -> Self {
        let images = Arc::new(LocalImageStore::new(
            config.media_root.clone(),
            config.public_base_url.clone(),
        ));
        Self::with_components(config, database, images, Arc::new(RandomShortCodeGenerator))
    }

    /// Assemble resources with explicit image store and short code generator
    #[must_use]
    pub fn with_components(
        config: ServerConfig,
        database: Database,
        images: Arc<dyn ImageStore>,
        short_codes: Arc<dyn ShortCodeGenerator>,
    ) -> Self {
        Self {
            auth_manager: AuthManager::new(&config.auth),
            config: Arc::new(config),
            database,
            images,
            short_codes,
        }
    }

    /// Require an authenticated caller
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without credentials and `AuthInvalid` for a
    /// bad token or a token whose user no longer exists
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        self.authenticate_optional(headers)
            .await?
            .ok_or_else(AppError::auth_required)
    }

    /// Resolve the caller if credentials were sent
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if credentials were sent but are not valid
    pub async fn authenticate_optional(&self, headers: &HeaderMap) -> AppResult<Option<AuthResult>> {
        let Some(token) = extract_token(headers)? else {
            return Ok(None);
        };
        let auth = self.auth_manager.authenticate_token(token)?;

        if self.database.users().get(auth.user_id).await?.is_none() {
            return Err(AppError::auth_invalid("User no longer exists"));
        }
        Ok(Some(auth))
    }
}
