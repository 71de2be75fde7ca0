// ABOUTME: Database pool setup, schema migrations and per-domain manager accessors
// ABOUTME: Opens SQLite via sqlx with foreign keys enforced and creates all tables idempotently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! [`Database`] owns the `SqlitePool` and hands out one manager per domain.
//! Managers are cheap wrappers around a pool clone; every method returns
//! `AppResult`.

mod catalog;
mod recipe_lists;
mod recipes;
mod subscriptions;
mod users;

pub use catalog::CatalogManager;
pub use recipe_lists::{RecipeListKind, RecipeListManager};
pub use recipes::RecipeManager;
pub use subscriptions::SubscriptionManager;
pub use users::UserManager;

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::info;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the database and run migrations
    ///
    /// File databases are created if missing, including the parent
    /// directory. In-memory databases use a single pinned connection so that
    /// every query sees the same schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or any migration fails
    pub async fn new(database_url: &DatabaseUrl) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&database_url.to_connection_string())
            .context("Invalid database URL")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = match database_url {
            DatabaseUrl::Memory => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                SqlitePoolOptions::new().connect_with(options).await
            }
        }
        .context("Failed to open database")?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %database_url, "Database ready");

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any `CREATE` statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_catalog().await?;
        self.migrate_recipes().await?;
        self.migrate_recipe_lists().await?;
        self.migrate_subscriptions().await?;
        Ok(())
    }

    /// User directory operations
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Tag and ingredient operations
    #[must_use]
    pub fn catalog(&self) -> CatalogManager {
        CatalogManager::new(self.pool.clone())
    }

    /// Recipe operations
    #[must_use]
    pub fn recipes(&self) -> RecipeManager {
        RecipeManager::new(self.pool.clone())
    }

    /// Favorites list operations
    #[must_use]
    pub fn favorites(&self) -> RecipeListManager {
        RecipeListManager::new(self.pool.clone(), RecipeListKind::Favorites)
    }

    /// Shopping cart operations
    #[must_use]
    pub fn shopping_cart(&self) -> RecipeListManager {
        RecipeListManager::new(self.pool.clone(), RecipeListKind::ShoppingCart)
    }

    /// Per-user recipe list operations for either kind
    #[must_use]
    pub fn recipe_list(&self, kind: RecipeListKind) -> RecipeListManager {
        RecipeListManager::new(self.pool.clone(), kind)
    }

    /// Subscription operations
    #[must_use]
    pub fn subscriptions(&self) -> SubscriptionManager {
        SubscriptionManager::new(self.pool.clone())
    }
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

/// Convert a `COUNT(*)` result to the unsigned count used in page envelopes
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
