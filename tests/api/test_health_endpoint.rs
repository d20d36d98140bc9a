// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ndarray::Array4;
use reid_embed_node::api::http_server::{create_app, AppState};
use reid_embed_node::config::NodeConfig;
use reid_embed_node::inference::{Embedder, InferenceError};
use reid_embed_node::storage::MockObjectStore;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

struct StubEmbedder;

impl Embedder for StubEmbedder {
    fn run(&self, _input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        Ok(vec![0.0; 1024])
    }

    fn dimension(&self) -> usize {
        1024
    }
}

#[tokio::test]
async fn test_health_reports_model_info() {
    let state = AppState {
        engine: Arc::new(StubEmbedder),
        store: Arc::new(MockObjectStore::new()),
        config: Arc::new(NodeConfig::default()),
    };
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["dimension"], 1024);
    assert_eq!(json["input"]["height"], 256);
    assert_eq!(json["input"]["width"], 128);
}
