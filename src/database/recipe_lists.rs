// ABOUTME: Per-user recipe lists (favorites and shopping cart) as one generic association manager
// ABOUTME: Add/remove/contains over (user, recipe) pairs guarded by a UNIQUE constraint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::Database;
use crate::errors::{is_unique_violation, AppError, AppResult};

/// Which per-user recipe list an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeListKind {
    /// Recipes the user marked as favorite
    Favorites,
    /// Recipes whose ingredients go into the shopping list
    ShoppingCart,
}

impl RecipeListKind {
    /// Every list kind, for migrations
    pub const ALL: [Self; 2] = [Self::Favorites, Self::ShoppingCart];

    /// Backing table
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable list name used in messages and logs
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }

    fn duplicate_message(self) -> String {
        format!("Recipe is already in your {}", self.label())
    }

    fn missing_message(self) -> String {
        format!("You don't have this recipe in your {}", self.label())
    }
}

impl Database {
    /// Create the favorites and shopping cart tables
    pub(super) async fn migrate_recipe_lists(&self) -> anyhow::Result<()> {
        for kind in RecipeListKind::ALL {
            let table = kind.table();
            sqlx::query(&format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, recipe_id)
                )
                "
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

/// Database operations for one kind of per-user recipe list
pub struct RecipeListManager {
    pool: SqlitePool,
    kind: RecipeListKind,
}

impl RecipeListManager {
    /// Create a manager for the given list kind
    #[must_use]
    pub const fn new(pool: SqlitePool, kind: RecipeListKind) -> Self {
        Self { pool, kind }
    }

    /// Add a recipe to the user's list
    ///
    /// The caller is expected to have checked that the recipe exists.
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the recipe is already listed
    pub async fn add(&self, user_id: i64, recipe_id: i64) -> AppResult<()> {
        let table = self.kind.table();
        sqlx::query(&format!(
            "INSERT INTO {table} (user_id, recipe_id, created_at) VALUES ($1, $2, $3)"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(self.kind.duplicate_message())
            } else {
                AppError::database(format!("Failed to add to {}: {e}", self.kind.label()))
            }
        })?;

        info!(user_id, recipe_id, list = self.kind.label(), "Recipe added to list");
        Ok(())
    }

    /// Remove a recipe from the user's list
    ///
    /// # Errors
    ///
    /// Returns `AssociationMissing` if the recipe was not listed
    pub async fn remove(&self, user_id: i64, recipe_id: i64) -> AppResult<()> {
        let table = self.kind.table();
        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to remove from {}: {e}", self.kind.label()))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::association_missing(self.kind.missing_message()));
        }

        info!(user_id, recipe_id, list = self.kind.label(), "Recipe removed from list");
        Ok(())
    }

    /// Whether the recipe is on the user's list
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn contains(&self, user_id: i64, recipe_id: i64) -> AppResult<bool> {
        let table = self.kind.table();
        let found: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT 1 FROM {table} WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check {}: {e}", self.kind.label())))?;

        Ok(found.is_some())
    }
}
