// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the re-identification encoder
//!
//! The model contract is a fixed `[1, 3, H, W]` float32 tensor with values
//! in `[0, 1]`, channel-first, RGB. Pixels are scaled by 1/255 and nothing
//! else: the model was exported without mean/std normalization, so adding
//! it here would silently degrade accuracy.

use image::DynamicImage;
use ndarray::Array4;

/// Preprocess a decoded image into the model's input tensor
///
/// Steps:
/// 1. Force 3-channel RGB (grayscale/alpha/palette images are converted)
/// 2. Resize to exactly `width` x `height` (stretch; aspect ratio is not
///    preserved; no cropping or padding)
/// 3. Scale u8 pixels to f32 in `[0, 1]`
/// 4. Rearrange to NCHW with a batch dimension of 1
pub fn preprocess_to_tensor(image: &DynamicImage, width: u32, height: u32) -> Array4<f32> {
    let resized = image.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let (w, h) = (width as usize, height as usize);
    let mut tensor = Array4::zeros((1, 3, h, w));

    for y in 0..h {
        for x in 0..w {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    tensor
}
