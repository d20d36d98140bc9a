// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embed tests
//!
//! The inference engine is replaced by a deterministic stub so these tests
//! exercise the full HTTP stack (multipart parsing, decoding, preprocessing,
//! normalization, error mapping) without a model file.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ndarray::Array4;
use reid_embed_node::api::http_server::{create_app, AppState};
use reid_embed_node::config::NodeConfig;
use reid_embed_node::inference::{Embedder, InferenceError};
use reid_embed_node::storage::MockObjectStore;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// Deterministic stand-in for the ONNX session
struct StubEmbedder {
    dimension: usize,
}

impl Embedder for StubEmbedder {
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        assert_eq!(input.shape()[0], 1);
        assert_eq!(input.shape()[1], 3);
        Ok((1..=self.dimension).map(|i| i as f32).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Always fails, for the request-scoped error path
struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn run(&self, _input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        Err(InferenceError::Execution("synthetic failure".to_string()))
    }

    fn dimension(&self) -> usize {
        8
    }
}

fn test_state(engine: Arc<dyn Embedder>) -> AppState {
    AppState {
        engine,
        store: Arc::new(MockObjectStore::new()),
        config: Arc::new(NodeConfig::default()),
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode test png");
    bytes
}

fn multipart_request(field_name: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "test-boundary-7a3f";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"img.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            boundary, field_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/v1/embed")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_returns_normalized_embedding() {
    let app = create_app(test_state(Arc::new(StubEmbedder { dimension: 8 })));

    let response = app
        .oneshot(multipart_request("file", &png_bytes(64, 128)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let id = json["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let embedding: Vec<f32> = json["embedding"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap() as f32)
        .collect();
    assert_eq!(embedding.len(), 8);

    // The stub returns [1..=8]; the response must be the normalized version
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4, "norm was {}", norm);

    let raw_norm: f32 = (1..=8).map(|i| (i * i) as f32).sum::<f32>().sqrt();
    assert!((embedding[0] - 1.0 / raw_norm).abs() < 1e-5);
    assert!((embedding[7] - 8.0 / raw_norm).abs() < 1e-5);
}

#[tokio::test]
async fn test_upload_ids_are_unique_per_request() {
    let state = test_state(Arc::new(StubEmbedder { dimension: 4 }));

    let first = create_app(state.clone())
        .oneshot(multipart_request("file", &png_bytes(16, 16)))
        .await
        .unwrap();
    let second = create_app(state)
        .oneshot(multipart_request("file", &png_bytes(16, 16)))
        .await
        .unwrap();

    let a = body_json(first).await;
    let b = body_json(second).await;
    assert_ne!(a["id"], b["id"]);
}

#[tokio::test]
async fn test_upload_undecodable_bytes_rejected() {
    let app = create_app(test_state(Arc::new(StubEmbedder { dimension: 8 })));

    let response = app
        .oneshot(multipart_request("file", b"this is not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error_type"], "invalid_request");
    assert!(json["request_id"].as_str().is_some());
}

#[tokio::test]
async fn test_upload_missing_file_field_rejected() {
    let app = create_app(test_state(Arc::new(StubEmbedder { dimension: 8 })));

    let response = app
        .oneshot(multipart_request("wrong_name", &png_bytes(16, 16)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_inference_failure_maps_to_client_error() {
    let app = create_app(test_state(Arc::new(FailingEmbedder)));

    let response = app
        .oneshot(multipart_request("file", &png_bytes(16, 16)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error_type"], "inference_failed");
}

#[tokio::test]
async fn test_get_method_not_allowed() {
    let app = create_app(test_state(Arc::new(StubEmbedder { dimension: 8 })));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/embed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
