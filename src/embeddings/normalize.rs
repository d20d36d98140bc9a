// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! L2 normalization of raw embedding vectors

/// Epsilon added to the norm so an all-zero vector divides cleanly to zero
/// instead of producing NaN
const NORM_EPSILON: f32 = 1e-12;

/// Normalizes a raw embedding in place: each component is divided by the
/// vector's Euclidean norm plus a small epsilon.
///
/// For any non-degenerate input the result has norm ~1.0; an all-zero input
/// stays all-zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm + NORM_EPSILON;
    for x in v.iter_mut() {
        *x /= denom;
    }
}
