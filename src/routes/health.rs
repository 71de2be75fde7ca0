// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports liveness and database reachability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::constants::{endpoints, service_names};
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(endpoints::HEALTH_CHECK, get(Self::handle_health))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let database = match sqlx::query("SELECT 1")
            .execute(resources.database.pool())
            .await
        {
            Ok(_) => "ok",
            Err(e) => {
                warn!("Health check database probe failed: {e}");
                "unavailable"
            }
        };

        Json(json!({
            "status": "healthy",
            "service": service_names::FOODGRAM_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
