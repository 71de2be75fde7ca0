// ABOUTME: Recipe models: persisted recipe rows, ingredient lines and write drafts
// ABOUTME: RecipeDraft carries the validation shared by create and full-replace update
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Ingredient, Tag};
use crate::constants::{lengths, limits};
use crate::errors::{AppError, AppResult};

/// Persisted recipe row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Row id
    pub id: i64,
    /// Author user id
    pub author_id: i64,
    /// Title
    pub name: String,
    /// Description and instructions
    pub text: String,
    /// Stored image reference, relative to the media root
    pub image: String,
    /// Minutes, 1-200
    pub cooking_time: i64,
    /// Unique short code, assigned on first save
    pub short_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Ingredient attached to a recipe with its amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientLine {
    /// Catalog ingredient
    pub ingredient: Ingredient,
    /// Amount in the ingredient's unit
    pub amount: i64,
}

/// Reference to a catalog ingredient with an amount, as submitted by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Catalog ingredient id
    pub ingredient_id: i64,
    /// Amount, 1-1000
    pub amount: i64,
}

/// Validated content of a recipe for insert or full replace
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    /// Title
    pub name: String,
    /// Description
    pub text: String,
    /// Stored image reference
    pub image: String,
    /// Minutes
    pub cooking_time: i64,
    /// Tag ids, in submission order
    pub tags: Vec<i64>,
    /// Ingredient references, in submission order
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
    /// Check field bounds and the uniqueness of tags and ingredients
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first violated rule
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        if self.name.chars().count() > lengths::RECIPE_NAME {
            return Err(AppError::invalid_input(format!(
                "Recipe name must be at most {} characters",
                lengths::RECIPE_NAME
            ))
            .with_field("name"));
        }
        if self.text.trim().is_empty() {
            return Err(AppError::missing_field("text"));
        }
        if self.image.is_empty() {
            return Err(AppError::missing_field("image"));
        }
        if !(limits::MIN_COOKING_TIME..=limits::MAX_COOKING_TIME).contains(&self.cooking_time) {
            return Err(AppError::out_of_range(
                "cooking_time",
                limits::MIN_COOKING_TIME,
                limits::MAX_COOKING_TIME,
            ));
        }

        if self.ingredients.is_empty() {
            return Err(
                AppError::invalid_input("A recipe needs at least one ingredient")
                    .with_field("ingredients"),
            );
        }
        let mut seen = HashSet::with_capacity(self.ingredients.len());
        for item in &self.ingredients {
            if !seen.insert(item.ingredient_id) {
                return Err(AppError::invalid_input(format!(
                    "Ingredient {} is listed more than once",
                    item.ingredient_id
                ))
                .with_field("ingredients"));
            }
            if !(limits::MIN_AMOUNT..=limits::MAX_AMOUNT).contains(&item.amount) {
                return Err(AppError::out_of_range(
                    "amount",
                    limits::MIN_AMOUNT,
                    limits::MAX_AMOUNT,
                ));
            }
        }

        if self.tags.is_empty() {
            return Err(
                AppError::invalid_input("A recipe needs at least one tag").with_field("tags"),
            );
        }
        let mut seen = HashSet::with_capacity(self.tags.len());
        if let Some(dup) = self.tags.iter().find(|id| !seen.insert(**id)) {
            return Err(
                AppError::invalid_input(format!("Tag {dup} is listed more than once"))
                    .with_field("tags"),
            );
        }

        Ok(())
    }
}

/// Recipe list filters
///
/// Viewer-relative filters are only applied when `viewer_id` is set.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<i64>,
    /// Recipes carrying any of these tag slugs
    pub tags: Vec<String>,
    /// `Some(true)` keeps only favorites, `Some(false)` excludes them
    pub is_favorited: Option<bool>,
    /// `Some(true)` keeps only carted recipes, `Some(false)` excludes them
    pub is_in_shopping_cart: Option<bool>,
    /// Requesting user
    pub viewer_id: Option<i64>,
}

/// One ingredient line of a carted recipe, input to shopping list aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount contributed by one recipe
    pub amount: i64,
}

/// Fully resolved recipe with its tags and ingredient lines
#[derive(Debug, Clone)]
pub struct RecipeDetails {
    /// Recipe row
    pub recipe: Recipe,
    /// Attached tags, in attachment order
    pub tags: Vec<Tag>,
    /// Attached ingredients, in attachment order
    pub ingredients: Vec<RecipeIngredientLine>,
}
