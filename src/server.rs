// ABOUTME: HTTP server assembly and lifecycle
// ABOUTME: Composes domain routers with media serving, CORS, request ids and tracing, then serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use anyhow::Context;
use axum::{body::Body, extract::DefaultBodyLimit, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use crate::constants::{endpoints, limits};
use crate::middleware::{make_request_span, record_response, setup_cors, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, CatalogRoutes, HealthRoutes, RecipeRoutes, ShortLinkRoutes, UserRoutes,
};

/// Build the complete application router
///
/// Layers run top to bottom: a request id is assigned, the request is traced
/// under that id, CORS is applied, and the id is echoed on the response.
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let media = ServeDir::new(&resources.config.media_root);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .merge(CatalogRoutes::routes(resources.clone()))
        .merge(RecipeRoutes::routes(resources.clone()))
        .merge(ShortLinkRoutes::routes(resources.clone()))
        .nest_service(endpoints::MEDIA, media)
        .layer(DefaultBodyLimit::max(limits::MAX_REQUEST_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span::<Body>)
                        .on_response(record_response::<Body>),
                )
                .layer(setup_cors(&resources.config))
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run_server(resources: Arc<ServerResources>) -> anyhow::Result<()> {
    let address = resources.config.bind_address();
    let app = build_router(&resources);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Foodgram server listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Foodgram server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
