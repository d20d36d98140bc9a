// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API module
//!
//! Two ways in, one pipeline: POST /v1/embed accepts the image bytes as a
//! multipart upload; POST /v1/embed/object accepts a JSON object reference
//! and fetches the bytes from storage first. Both produce the same
//! `{id, embedding}` response.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{embed_object_handler, embed_upload_handler};
pub use request::EmbedObjectRequest;
pub use response::EmbedResponse;
