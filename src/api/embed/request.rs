// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// POST /v1/embed/object request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedObjectRequest {
    /// Object reference in `scheme://bucket/path` form
    pub uri: String,
}
