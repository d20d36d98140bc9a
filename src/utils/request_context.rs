// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Per-request id and stage timing
//!
//! Every embed request gets a short correlation id that appears in the
//! response body and in every log line for the request. Stage timings are
//! recorded as the pipeline advances so the completion log can report how
//! long preprocessing and inference each took.

use std::time::Instant;
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestContext {
    id: String,
    started: Instant,
    preprocessed_at: Option<Instant>,
    inferred_at: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with a fresh 8-hex-character request id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            started: Instant::now(),
            preprocessed_at: None,
            inferred_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mark_preprocessed(&mut self) {
        self.preprocessed_at = Some(Instant::now());
    }

    pub fn mark_inferred(&mut self) {
        self.inferred_at = Some(Instant::now());
    }

    /// Milliseconds from request start to the end of preprocessing
    pub fn pre_ms(&self) -> f64 {
        match self.preprocessed_at {
            Some(at) => at.duration_since(self.started).as_secs_f64() * 1000.0,
            None => 0.0,
        }
    }

    /// Milliseconds spent in model inference
    pub fn infer_ms(&self) -> f64 {
        match (self.preprocessed_at, self.inferred_at) {
            (Some(pre), Some(inf)) => inf.duration_since(pre).as_secs_f64() * 1000.0,
            _ => 0.0,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
