// ABOUTME: Server binary for the Foodgram recipe sharing API
// ABOUTME: Loads configuration, opens the database and serves HTTP until shutdown
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Foodgram Server Binary
//!
//! Starts the Foodgram HTTP API backed by `SQLite`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use foodgram_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram - recipe sharing API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`sqlite:./data/foodgram.db`, `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&database_url);
    }
    config.validate()?;

    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!(
        "Database initialized: {}",
        config.database_url.to_connection_string()
    );

    let resources = Arc::new(ServerResources::new(config, database));
    if let Err(e) = server::run_server(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
