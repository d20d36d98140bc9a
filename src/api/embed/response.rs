// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// Successful embed response
///
/// `embedding` is the L2-normalized vector; `id` is the request's
/// correlation id, the same one that appears in the server logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub id: String,
    pub embedding: Vec<f32>,
}
