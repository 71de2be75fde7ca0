// ABOUTME: Core data models for users, catalog entries and recipes
// ABOUTME: Re-exports persisted entities and validated write drafts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Persisted entities (`User`, `Tag`, `Ingredient`, `Recipe`) and the
//! validated drafts used to create or replace them. HTTP request and
//! response shapes live next to their routes.

/// Tags and ingredients
pub mod catalog;
/// Recipes, ingredient lines and drafts
pub mod recipe;
/// Users and registration drafts
pub mod user;

pub use catalog::{search_key, Ingredient, Tag};
pub use recipe::{
    IngredientAmount, Recipe, RecipeDetails, RecipeDraft, RecipeFilter, RecipeIngredientLine,
    ShoppingItem,
};
pub use user::{NewUser, User};
