// ABOUTME: Tag and ingredient catalog database operations
// ABOUTME: Read-only lookups, case-insensitive ingredient prefix search and idempotent seeding inserts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{search_key, Ingredient, Tag};

impl Database {
    /// Create tag and ingredient tables
    pub(super) async fn migrate_catalog(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // search_name holds the Unicode-lowercased name; SQLite lower() is ASCII-only
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL,
                search_name TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_ingredients_search_name ON ingredients(search_name)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Tag and ingredient database operations manager
pub struct CatalogManager {
    pool: SqlitePool,
}

impl CatalogManager {
    /// Create a new catalog manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// All tags ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tags: {e}")))?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    /// Get a tag by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_tag(&self, id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get tag: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_tag))
    }

    /// Insert a tag unless one with the same name or slug exists
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed tag, or a database error
    pub async fn insert_tag(&self, name: &str, slug: &str) -> AppResult<bool> {
        Tag::validate(name, slug)?;
        let result = sqlx::query("INSERT OR IGNORE INTO tags (name, slug) VALUES ($1, $2)")
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert tag: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    /// Ingredients ordered by name, optionally restricted to a name prefix
    ///
    /// The prefix match is case-insensitive for any script.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search_ingredients(&self, prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let rows = match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let key = search_key(prefix);
                let len = i64::try_from(key.chars().count()).unwrap_or(i64::MAX);
                sqlx::query(
                    r"
                    SELECT id, name, measurement_unit FROM ingredients
                    WHERE substr(search_name, 1, $1) = $2
                    ORDER BY name, id
                    ",
                )
                .bind(len)
                .bind(key)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT id, name, measurement_unit FROM ingredients ORDER BY name, id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        Ok(rows.iter().map(Self::row_to_ingredient).collect())
    }

    /// Get an ingredient by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_ingredient(&self, id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_ingredient))
    }

    /// Insert an ingredient unless the `(name, unit)` pair exists
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed ingredient, or a database error
    pub async fn insert_ingredient(&self, name: &str, measurement_unit: &str) -> AppResult<bool> {
        Ingredient::validate(name, measurement_unit)?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO ingredients (name, measurement_unit, search_name)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .bind(search_key(name))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_tag(row: &SqliteRow) -> Tag {
        Tag {
            id: row.get("id"),
            name: row.get("name"),
            slug: row.get("slug"),
        }
    }

    pub(crate) fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
        Ingredient {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
        }
    }
}
