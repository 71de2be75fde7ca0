// ABOUTME: Catalog models for recipe tags and ingredients
// ABOUTME: Includes the Unicode-aware case-insensitive prefix match used by ingredient search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::lengths;
use crate::errors::{AppError, AppResult};

/// Recipe tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Row id
    pub id: i64,
    /// Display name, unique
    pub name: String,
    /// URL slug, unique
    pub slug: String,
}

impl Tag {
    /// Validate a tag name and slug before insertion
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or overlong values or a slug
    /// outside `[-a-zA-Z0-9_]`
    pub fn validate(name: &str, slug: &str) -> AppResult<()> {
        if name.trim().is_empty() || name.chars().count() > lengths::TAG {
            return Err(AppError::invalid_input(format!(
                "Tag name must be 1-{} characters",
                lengths::TAG
            ))
            .with_field("name"));
        }
        let slug_ok = !slug.is_empty()
            && slug.chars().count() <= lengths::TAG
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !slug_ok {
            return Err(AppError::invalid_input(format!("Invalid tag slug '{slug}'"))
                .with_field("slug"));
        }
        Ok(())
    }
}

/// Ingredient with its measurement unit
///
/// `(name, measurement_unit)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Row id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Unit the amount is measured in
    pub measurement_unit: String,
}

impl Ingredient {
    /// Validate name and unit lengths before insertion
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or overlong values
    pub fn validate(name: &str, measurement_unit: &str) -> AppResult<()> {
        if name.trim().is_empty() || name.chars().count() > lengths::INGREDIENT_NAME {
            return Err(AppError::invalid_input(format!(
                "Ingredient name must be 1-{} characters",
                lengths::INGREDIENT_NAME
            ))
            .with_field("name"));
        }
        if measurement_unit.trim().is_empty()
            || measurement_unit.chars().count() > lengths::MEASUREMENT_UNIT
        {
            return Err(AppError::invalid_input(format!(
                "Measurement unit must be 1-{} characters",
                lengths::MEASUREMENT_UNIT
            ))
            .with_field("measurement_unit"));
        }
        Ok(())
    }
}

/// Normalised form of a name used for case-insensitive lookups
///
/// `SQLite`'s `lower()` only folds ASCII, so the folded form is computed
/// here and stored alongside the name.
#[must_use]
pub fn search_key(name: &str) -> String {
    name.to_lowercase()
}
