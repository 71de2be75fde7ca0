// ABOUTME: Catalog seeding utility for tags and ingredients
// ABOUTME: Loads a JSON catalog file into the database, skipping rows that already exist
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Seeds the read-only catalog.
//!
//! The input file looks like:
//!
//! ```json
//! {
//!   "tags": [{"name": "Breakfast", "slug": "breakfast"}],
//!   "ingredients": [{"name": "salt", "measurement_unit": "g"}]
//! }
//! ```
//!
//! Usage:
//! ```bash
//! cargo run --bin foodgram-seed -- data/catalog.json
//! cargo run --bin foodgram-seed -- data/catalog.json --database-url sqlite:./data/foodgram.db
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use foodgram_server::{
    config::DatabaseUrl,
    database::Database,
    logging,
    models::{Ingredient, Tag},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "foodgram-seed")]
#[command(about = "Load tags and ingredients into the Foodgram database")]
struct Args {
    /// JSON catalog file
    file: PathBuf,

    /// Database URL (defaults to `DATABASE_URL`, then `sqlite:./data/foodgram.db`)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tags: Vec<TagSeed>,
    #[serde(default)]
    ingredients: Vec<IngredientSeed>,
}

#[derive(Debug, Deserialize)]
struct TagSeed {
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    measurement_unit: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let catalog: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    let database_url = args
        .database_url
        .as_deref()
        .map(DatabaseUrl::parse_url)
        .unwrap_or_default();
    let database = Database::new(&database_url).await?;
    let catalog_db = database.catalog();

    let mut tags_added = 0usize;
    for tag in &catalog.tags {
        if let Err(e) = Tag::validate(&tag.name, &tag.slug) {
            warn!("Skipping tag '{}': {}", tag.name, e.message);
            continue;
        }
        if catalog_db.insert_tag(&tag.name, &tag.slug).await? {
            tags_added += 1;
        }
    }

    let mut ingredients_added = 0usize;
    for ingredient in &catalog.ingredients {
        if let Err(e) = Ingredient::validate(&ingredient.name, &ingredient.measurement_unit) {
            warn!("Skipping ingredient '{}': {}", ingredient.name, e.message);
            continue;
        }
        if catalog_db
            .insert_ingredient(&ingredient.name, &ingredient.measurement_unit)
            .await?
        {
            ingredients_added += 1;
        }
    }

    info!(
        tags_added,
        tags_skipped = catalog.tags.len() - tags_added,
        ingredients_added,
        ingredients_skipped = catalog.ingredients.len() - ingredients_added,
        "Catalog seeding complete"
    );

    Ok(())
}
