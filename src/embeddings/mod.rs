// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding post-processing
//!
//! Raw model output is turned into a unit-length vector here. The vector's
//! numeric contents are never logged, only its shape.

pub mod normalize;

pub use normalize::l2_normalize;
