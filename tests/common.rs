// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, catalog seeding, and user and recipe fixtures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `foodgram_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use foodgram_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    images::LocalImageStore,
    models::{Ingredient, IngredientAmount, NewUser, Recipe, RecipeDraft, Tag, User},
    resources::ServerResources,
    services::short_links::{RandomShortCodeGenerator, ShortCodeGenerator},
};
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// 1x1 transparent PNG as a data URI
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Password used for every fixture user
pub const TEST_PASSWORD: &str = "Sup3r-secret-pass";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; default to WARN for quiet tests
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server resources backed by an in-memory database and a temporary media root
///
/// The temporary directory lives as long as this value.
pub struct TestContext {
    pub resources: Arc<ServerResources>,
    pub media: TempDir,
}

impl TestContext {
    /// Full application router
    pub fn router(&self) -> axum::Router {
        foodgram_server::server::build_router(&self.resources)
    }

    pub fn database(&self) -> &Database {
        &self.resources.database
    }
}

/// Standard test resources with random short codes
pub async fn create_test_context() -> Result<TestContext> {
    create_test_context_with_codes(Arc::new(RandomShortCodeGenerator)).await
}

/// Test resources with an explicit short code generator
pub async fn create_test_context_with_codes(
    codes: Arc<dyn ShortCodeGenerator>,
) -> Result<TestContext> {
    build_test_context(codes, false).await
}

/// Test resources backed by a database file inside the temporary directory
///
/// Unlike `sqlite::memory:`, a file database uses a multi-connection pool,
/// so concurrent writers really contend for the write lock.
pub async fn create_file_test_context() -> Result<TestContext> {
    build_test_context(Arc::new(RandomShortCodeGenerator), true).await
}

async fn build_test_context(
    codes: Arc<dyn ShortCodeGenerator>,
    file_database: bool,
) -> Result<TestContext> {
    init_test_logging();
    let media = tempfile::tempdir()?;
    let mut config = ServerConfig::for_testing(media.path().to_path_buf());
    if file_database {
        config.database_url = DatabaseUrl::SQLite {
            path: media.path().join("foodgram.db"),
        };
    }
    let database = Database::new(&config.database_url).await?;
    let images = Arc::new(LocalImageStore::new(
        media.path(),
        config.public_base_url.clone(),
    ));

    let resources = Arc::new(ServerResources::with_components(
        config, database, images, codes,
    ));
    Ok(TestContext { resources, media })
}

/// Seeded catalog rows
pub struct TestCatalog {
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl TestCatalog {
    pub fn tag(&self, slug: &str) -> &Tag {
        self.tags.iter().find(|t| t.slug == slug).expect("unknown tag")
    }

    pub fn ingredient(&self, name: &str) -> &Ingredient {
        self.ingredients
            .iter()
            .find(|i| i.name == name)
            .expect("unknown ingredient")
    }
}

/// Insert a small tag and ingredient catalog
pub async fn seed_catalog(database: &Database) -> Result<TestCatalog> {
    let catalog = database.catalog();
    for (name, slug) in [
        ("Breakfast", "breakfast"),
        ("Lunch", "lunch"),
        ("Dinner", "dinner"),
    ] {
        catalog.insert_tag(name, slug).await?;
    }
    for (name, unit) in [
        ("salt", "g"),
        ("sugar", "g"),
        ("flour", "g"),
        ("egg", "pcs"),
        ("Молоко", "мл"),
        ("Помидор", "шт"),
        ("молотый перец", "г"),
    ] {
        catalog.insert_ingredient(name, unit).await?;
    }

    Ok(TestCatalog {
        tags: catalog.list_tags().await?,
        ingredients: catalog.search_ingredients(None).await?,
    })
}

/// Register a user directly in the database and issue a token
pub async fn create_test_user(
    resources: &ServerResources,
    username: &str,
) -> Result<(User, String)> {
    let new_user = NewUser {
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        first_name: "Test".to_owned(),
        last_name: "Cook".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    };
    let hash = resources.auth_manager.hash_password(TEST_PASSWORD).await?;
    let user = resources.database.users().create(&new_user, &hash).await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, token))
}

/// Recipe draft with the given tags and `(ingredient_id, amount)` lines
pub fn recipe_draft(name: &str, tags: &[i64], ingredients: &[(i64, i64)]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_owned(),
        text: format!("How to make {name}"),
        image: "recipes/images/fixture.png".to_owned(),
        cooking_time: 15,
        tags: tags.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|&(ingredient_id, amount)| IngredientAmount {
                ingredient_id,
                amount,
            })
            .collect(),
    }
}

/// Insert a recipe directly through the database layer
pub async fn create_test_recipe(
    resources: &ServerResources,
    author_id: i64,
    name: &str,
    tags: &[i64],
    ingredients: &[(i64, i64)],
) -> Result<Recipe> {
    let draft = recipe_draft(name, tags, ingredients);
    let recipe = resources
        .database
        .recipes()
        .create(author_id, &draft, resources.short_codes.as_ref())
        .await?;
    Ok(recipe)
}
