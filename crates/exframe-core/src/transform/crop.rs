//! Cropping decoded pixels by a normalized rect.

use crate::decode::DecodedImage;
use crate::geometry::NormalizedCropRect;

/// Pixel bounds `(left, top, right, bottom)` of `rect` on a
/// `width x height` image. Edges are rounded independently so that
/// neighbouring rects tile without gaps; the result is at least 1x1.
pub fn crop_bounds(rect: &NormalizedCropRect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let edge = |value: f64, extent: u32| -> u32 {
        (value.clamp(0.0, 1.0) * extent as f64).round() as u32
    };

    let left = edge(rect.x, width).min(width.saturating_sub(1));
    let top = edge(rect.y, height).min(height.saturating_sub(1));
    let right = edge(rect.x + rect.width, width).clamp(left + 1, width.max(left + 1));
    let bottom = edge(rect.y + rect.height, height).clamp(top + 1, height.max(top + 1));

    (left, top, right, bottom)
}

/// Cut the region described by `rect` out of `image`.
///
/// The full rect returns a copy. Empty images and images whose buffer does
/// not match their dimensions are returned unchanged.
pub fn apply_crop(image: &DecodedImage, rect: &NormalizedCropRect) -> DecodedImage {
    if !image.is_valid() || rect.is_full(1e-9) {
        return image.clone();
    }

    let (left, top, right, bottom) = crop_bounds(rect, image.width, image.height);
    let out_width = right - left;
    let out_height = bottom - top;

    let stride = image.width as usize * 3;
    let row_len = out_width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * out_height as usize);

    for y in top..bottom {
        let start = y as usize * stride + left as usize * 3;
        pixels.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    DecodedImage {
        width: out_width,
        height: out_height,
        pixels,
    }
}
