// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX inference for the re-identification embedding model
//!
//! The session is created once at startup and shared read-only by every
//! request. Provider selection (CUDA vs. CPU) happens exactly once, here.

pub mod engine;

pub use engine::{Embedder, InferenceError, ProviderPolicy, ReidSession};
