// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api::embed::{embed_object_handler, embed_upload_handler};
use crate::config::NodeConfig;
use crate::inference::Embedder;
use crate::storage::ObjectStore;
use crate::version;

/// Shared state handed to every handler. All members are built once at
/// startup; handlers only read them.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Embedder>,
    pub store: Arc<dyn ObjectStore>,
    pub config: Arc<NodeConfig>,
}

/// Builds the router. Kept separate from [`start_server`] so tests can
/// drive the full stack with `tower::ServiceExt::oneshot`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/embed", post(embed_upload_handler))
        .route("/v1/embed/object", post(embed_object_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.listen_addr().parse::<SocketAddr>()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(json!({
        "status": "ok",
        "version": version::get_version_string(),
        "dimension": state.engine.dimension(),
        "input": {
            "height": state.config.input_h,
            "width": state.config.input_w,
        },
    }))
}
