// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use reid_embed_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    inference::{Embedder, ProviderPolicy, ReidSession},
    storage::HttpObjectStore,
    version,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("Starting re-id embedding node {}", version::VERSION);

    let config = NodeConfig::from_env();
    tracing::info!(
        "Configuration: model_path={} input={}x{} cuda_enabled={} port={}",
        config.model_path,
        config.input_h,
        config.input_w,
        config.cuda_enabled,
        config.api_port
    );

    // Any model failure here aborts startup; the node never serves traffic
    // without a working session.
    let policy = ProviderPolicy::from_flag(config.cuda_enabled);
    let engine = ReidSession::load(&config.model_path, config.input_h, config.input_w, policy)
        .context("Failed to initialize the inference engine")?;

    tracing::info!(
        "Model ready: dimension={} provider={}",
        engine.dimension(),
        engine.provider()
    );

    let store = HttpObjectStore::new(&config.storage_portal_url)
        .context("Failed to build the object store client")?;

    let state = AppState {
        engine: Arc::new(engine),
        store: Arc::new(store),
        config: Arc::new(config),
    };

    start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    Ok(())
}
