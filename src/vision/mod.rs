// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module: image decoding and tensor preprocessing
//!
//! This module turns arbitrary uploaded image bytes into the fixed-shape
//! `[1, 3, H, W]` float tensor the re-id model expects.

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
pub use preprocessing::preprocess_to_tensor;
