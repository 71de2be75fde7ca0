// ABOUTME: Recipe database operations with tag and ingredient associations
// ABOUTME: Transactional create/replace, short code assignment with collision retry, filtered listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};

use super::{parse_timestamp, to_count, CatalogManager, Database, RecipeListKind};
use crate::errors::{is_unique_violation_on, AppError, AppResult};
use crate::models::{
    IngredientAmount, Recipe, RecipeDetails, RecipeDraft, RecipeFilter, RecipeIngredientLine,
    ShoppingItem, Tag,
};
use crate::services::short_links::ShortCodeGenerator;

const RECIPE_COLUMNS: &str =
    "r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.short_url, r.created_at, r.updated_at";

impl Database {
    /// Create recipe and association tables
    pub(super) async fn migrate_recipes(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                text TEXT NOT NULL,
                image TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time BETWEEN 1 AND 200),
                short_url TEXT UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                UNIQUE (recipe_id, tag_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
                amount INTEGER NOT NULL CHECK (amount BETWEEN 1 AND 1000),
                UNIQUE (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name, id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Recipe database operations manager
pub struct RecipeManager {
    pool: SqlitePool,
}

impl RecipeManager {
    /// Create a new recipe manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a transaction that holds the write lock from its first statement
    ///
    /// A deferred transaction that reads before writing cannot wait for a
    /// concurrent writer and fails with `SQLITE_BUSY` instead.
    async fn begin_write(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    /// Insert a recipe with its tags and ingredients in one transaction
    ///
    /// The recipe receives a short code drawn from `codes`; colliding
    /// candidates are discarded until an unused one is stored.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid draft or unknown tag or
    /// ingredient ids, or a database error
    pub async fn create(
        &self,
        author_id: i64,
        draft: &RecipeDraft,
        codes: &dyn ShortCodeGenerator,
    ) -> AppResult<Recipe> {
        draft.validate()?;

        let mut tx = self.begin_write().await?;

        ensure_references_exist(&mut *tx, draft).await?;

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r"
            INSERT INTO recipes (author_id, name, text, image, cooking_time, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(author_id)
        .bind(&draft.name)
        .bind(&draft.text)
        .bind(&draft.image)
        .bind(draft.cooking_time)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        let recipe_id = result.last_insert_rowid();
        insert_associations(&mut *tx, recipe_id, draft).await?;
        let code = assign_short_code(&mut *tx, recipe_id, codes).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        info!(recipe_id, author_id, code = %code, "Recipe created");

        self.get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))
    }

    /// Replace a recipe's content, tags and ingredients in one transaction
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipe is gone, a validation error
    /// for an invalid draft, or a database error
    pub async fn update(&self, recipe_id: i64, draft: &RecipeDraft) -> AppResult<Recipe> {
        draft.validate()?;

        let mut tx = self.begin_write().await?;

        ensure_references_exist(&mut *tx, draft).await?;

        let result = sqlx::query(
            r"
            UPDATE recipes
            SET name = $1, text = $2, image = $3, cooking_time = $4, updated_at = $5
            WHERE id = $6
            ",
        )
        .bind(&draft.name)
        .bind(&draft.text)
        .bind(&draft.image)
        .bind(draft.cooking_time)
        .bind(Utc::now().to_rfc3339())
        .bind(recipe_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe"));
        }

        for table in ["recipe_tags", "recipe_ingredients"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE recipe_id = $1"))
                .bind(recipe_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to clear {table}: {e}")))?;
        }
        insert_associations(&mut *tx, recipe_id, draft).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        info!(recipe_id, "Recipe updated");

        self.get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))
    }

    /// Delete a recipe; associations cascade
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such recipe exists
    pub async fn delete(&self, recipe_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe"));
        }
        info!(recipe_id, "Recipe deleted");
        Ok(())
    }

    /// Get a recipe row by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, recipe_id: i64) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"))
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| Self::row_to_recipe(&r)).transpose()
    }

    /// Get a recipe with its tags and ingredient lines
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn get_details(&self, recipe_id: i64) -> AppResult<Option<RecipeDetails>> {
        let Some(recipe) = self.get(recipe_id).await? else {
            return Ok(None);
        };
        let tags = self.tags_for(recipe_id).await?;
        let ingredients = self.ingredients_for(recipe_id).await?;

        Ok(Some(RecipeDetails {
            recipe,
            tags,
            ingredients,
        }))
    }

    /// Tags attached to a recipe, in attachment order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn tags_for(&self, recipe_id: i64) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY rt.id
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe tags: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
                slug: row.get("slug"),
            })
            .collect())
    }

    /// Ingredient lines of a recipe, in attachment order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn ingredients_for(&self, recipe_id: i64) -> AppResult<Vec<RecipeIngredientLine>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.id
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe ingredients: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| RecipeIngredientLine {
                ingredient: CatalogManager::row_to_ingredient(row),
                amount: row.get("amount"),
            })
            .collect())
    }

    /// Recipe id owning a short code
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_by_short_code(&self, code: &str) -> AppResult<Option<i64>> {
        sqlx::query_scalar("SELECT id FROM recipes WHERE short_url = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to resolve short code: {e}")))
    }

    /// Return the recipe's short code, assigning one if it has none
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown recipe, or a database error
    pub async fn ensure_short_code(
        &self,
        recipe_id: i64,
        codes: &dyn ShortCodeGenerator,
    ) -> AppResult<String> {
        let recipe = self
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        if let Some(code) = recipe.short_url {
            return Ok(code);
        }

        let mut tx = self.begin_write().await?;
        let assigned: Option<String> =
            sqlx::query_scalar("SELECT short_url FROM recipes WHERE id = $1")
                .bind(recipe_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to read short code: {e}")))?
                .flatten();
        if let Some(code) = assigned {
            return Ok(code);
        }
        let code = assign_short_code(&mut *tx, recipe_id, codes).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit short code: {e}")))?;

        Ok(code)
    }

    /// Filtered recipe page ordered by name then id, with the total count
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Recipe>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r"));
        push_filters(&mut query, filter);
        query.push(" ORDER BY r.name, r.id LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let recipes = rows
            .iter()
            .map(Self::row_to_recipe)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((recipes, to_count(total)))
    }

    /// An author's recipes ordered by name then id, optionally truncated
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_by_author(&self, author_id: i64, limit: Option<i64>) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.author_id = $1 ORDER BY r.name, r.id LIMIT $2"
        ))
        .bind(author_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }

    /// Number of recipes by an author
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_by_author(&self, author_id: i64) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))?;

        Ok(to_count(total))
    }

    /// Every ingredient line of every recipe in a user's shopping cart
    ///
    /// Ordered by cart insertion, then by the order ingredients were
    /// attached to each recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn shopping_items(&self, user_id: i64) -> AppResult<Vec<ShoppingItem>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_cart sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            ORDER BY sc.id, ri.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to collect shopping items: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| ShoppingItem {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }

    fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
        Ok(Recipe {
            id: row.get("id"),
            author_id: row.get("author_id"),
            name: row.get("name"),
            text: row.get("text"),
            image: row.get("image"),
            cooking_time: row.get("cooking_time"),
            short_url: row.get("short_url"),
            created_at: parse_timestamp(row.get::<&str, _>("created_at"))?,
            updated_at: parse_timestamp(row.get::<&str, _>("updated_at"))?,
        })
    }
}

/// Draw candidates until one is stored on the recipe
///
/// The pre-check skips known codes cheaply; the UNIQUE constraint on
/// `short_url` catches a concurrent writer that claimed the same code
/// between check and update.
async fn assign_short_code(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    codes: &dyn ShortCodeGenerator,
) -> AppResult<String> {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let candidate = codes.generate();

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM recipes WHERE short_url = $1")
            .bind(&candidate)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to check short code: {e}")))?;
        if taken.is_some() {
            debug!(recipe_id, code = %candidate, attempts, "Short code taken, drawing again");
            continue;
        }

        if store_short_code(&mut *conn, recipe_id, &candidate).await? {
            debug!(recipe_id, code = %candidate, attempts, "Short code assigned");
            return Ok(candidate);
        }
        debug!(recipe_id, code = %candidate, attempts, "Short code claimed concurrently");
    }
}

/// Write `code` onto the recipe; `Ok(false)` when another recipe already holds it
async fn store_short_code(conn: &mut SqliteConnection, recipe_id: i64, code: &str) -> AppResult<bool> {
    match sqlx::query("UPDATE recipes SET short_url = $1 WHERE id = $2")
        .bind(code)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
    {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation_on(&e, "recipes.short_url") => Ok(false),
        Err(e) => Err(AppError::database(format!("Failed to assign short code: {e}"))),
    }
}

/// Reject drafts that reference tags or ingredients missing from the catalog
async fn ensure_references_exist(conn: &mut SqliteConnection, draft: &RecipeDraft) -> AppResult<()> {
    let missing = missing_ids(conn, "tags", &draft.tags).await?;
    if let Some(id) = missing.first() {
        return Err(AppError::invalid_input(format!("Tag {id} does not exist")).with_field("tags"));
    }

    let ingredient_ids: Vec<i64> = draft.ingredients.iter().map(|i| i.ingredient_id).collect();
    let missing = missing_ids(conn, "ingredients", &ingredient_ids).await?;
    if let Some(id) = missing.first() {
        return Err(
            AppError::invalid_input(format!("Ingredient {id} does not exist"))
                .with_field("ingredients"),
        );
    }

    Ok(())
}

async fn missing_ids(conn: &mut SqliteConnection, table: &str, ids: &[i64]) -> AppResult<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: HashSet<i64> = query
        .build_query_scalar::<i64>()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up {table}: {e}")))?
        .into_iter()
        .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

async fn insert_associations(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> AppResult<()> {
    for tag_id in &draft.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(*tag_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to attach tag: {e}")))?;
    }

    for IngredientAmount {
        ingredient_id,
        amount,
    } in &draft.ingredients
    {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(*ingredient_id)
        .bind(*amount)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to attach ingredient: {e}")))?;
    }

    Ok(())
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ");
        query.push_bind(author);
    }

    if !filter.tags.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut separated = query.separated(", ");
        for slug in &filter.tags {
            separated.push_bind(slug.clone());
        }
        separated.push_unseparated("))");
    }

    if let Some(viewer) = filter.viewer_id {
        for (kind, wanted) in [
            (RecipeListKind::Favorites, filter.is_favorited),
            (RecipeListKind::ShoppingCart, filter.is_in_shopping_cart),
        ] {
            let Some(wanted) = wanted else { continue };
            query.push(if wanted { " AND EXISTS" } else { " AND NOT EXISTS" });
            query.push(format!(
                " (SELECT 1 FROM {} l WHERE l.recipe_id = r.id AND l.user_id = ",
                kind.table()
            ));
            query.push_bind(viewer);
            query.push(")");
        }
    }
}
