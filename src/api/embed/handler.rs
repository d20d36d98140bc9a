// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embed and /v1/embed/object handlers
//!
//! Pipeline per request: obtain bytes (upload or storage fetch), decode,
//! preprocess to the model tensor, run inference, L2-normalize. The raw
//! embedding values never reach a log line, only the vector shape does.

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::Multipart;
use tracing::{info, warn};

use crate::api::embed::{EmbedObjectRequest, EmbedResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::embeddings::l2_normalize;
use crate::storage::ObjectRef;
use crate::utils::RequestContext;
use crate::vision::{decode_image_bytes, preprocess_to_tensor};

/// POST /v1/embed handler. Expects a multipart form with the image bytes
/// in a field named `file`.
pub async fn embed_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EmbedResponse>, Response> {
    let mut ctx = RequestContext::new();

    let bytes = match read_file_field(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(e) => return Err(fail(&ctx, e)),
    };

    let result = run_pipeline(&state, &mut ctx, &bytes).await;
    let response = result.map_err(|e| fail(&ctx, e))?;

    Ok(Json(response))
}

/// POST /v1/embed/object handler. Resolves the `uri` reference through the
/// object store, then runs the same pipeline as the upload path.
pub async fn embed_object_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbedObjectRequest>,
) -> Result<Json<EmbedResponse>, Response> {
    let mut ctx = RequestContext::new();

    let object = ObjectRef::parse(&request.uri).map_err(|e| fail(&ctx, e.into()))?;

    let bytes = match state.store.fetch(&object).await {
        Ok(bytes) => bytes,
        Err(e) => return Err(fail(&ctx, e.into())),
    };

    let result = run_pipeline(&state, &mut ctx, &bytes).await;
    let response = result.map_err(|e| fail(&ctx, e))?;

    Ok(Json(response))
}

/// Extracts the bytes of the `file` multipart field
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file: {}", e)))?;
            return Ok(data.to_vec());
        }
    }

    Err(ApiError::InvalidRequest(
        "No 'file' field in multipart request".to_string(),
    ))
}

/// Decode, preprocess, infer, normalize
async fn run_pipeline(
    state: &AppState,
    ctx: &mut RequestContext,
    bytes: &[u8],
) -> Result<EmbedResponse, ApiError> {
    let (image, info) = decode_image_bytes(bytes)?;
    let tensor = preprocess_to_tensor(&image, state.config.input_w, state.config.input_h);
    ctx.mark_preprocessed();

    // Inference is synchronous and can take tens of milliseconds on CPU;
    // keep it off the async worker threads.
    let engine = state.engine.clone();
    let mut embedding = tokio::task::spawn_blocking(move || engine.run(tensor))
        .await
        .map_err(|e| ApiError::InternalError(format!("Inference task failed: {}", e)))??;
    ctx.mark_inferred();

    l2_normalize(&mut embedding);

    info!(
        "embed ok rid={} src={}x{} resized={}x{} pre={:.1}ms infer={:.1}ms vec_shape=[1, {}]",
        ctx.id(),
        info.width,
        info.height,
        state.config.input_w,
        state.config.input_h,
        ctx.pre_ms(),
        ctx.infer_ms(),
        embedding.len()
    );

    Ok(EmbedResponse {
        id: ctx.id().to_string(),
        embedding,
    })
}

/// Logs the failure with the request id and converts it into a response
fn fail(ctx: &RequestContext, error: ApiError) -> Response {
    warn!("embed failed rid={} error={}", ctx.id(), error);
    error.into_response_with_id(ctx.id())
}
