//! Export-side pixel transforms.
//!
//! The crop view produces a [`NormalizedCropRect`] plus the rotation and flip
//! props. The high-resolution export applies exactly those values to the
//! decoded original, so preview and export agree at any pixel scale.
//!
//! # Transform Order
//!
//! 1. Crop by the normalized rect
//! 2. Flip
//! 3. Rotation (clockwise degrees)
//!
//! The preview image layer pivots flip and rotation on the crop box centre,
//! which is what this order produces.

mod crop;
mod flip;
mod rotation;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::geometry::{Flip, NormalizedCropRect};

pub use crop::{apply_crop, crop_bounds};
pub use flip::apply_flip;
pub use rotation::{apply_rotation, compute_rotated_bounds};

/// Everything the export needs from the crop view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportTransform {
    pub crop: NormalizedCropRect,
    /// Clockwise degrees
    pub rotation: f64,
    pub flip: Flip,
}

impl ExportTransform {
    pub fn is_identity(&self) -> bool {
        self.crop.is_full(1e-9)
            && self.rotation.rem_euclid(360.0) == 0.0
            && self.flip == Flip::NONE
    }
}

/// Apply crop, flip and rotation in export order.
pub fn render_export(image: &DecodedImage, transform: &ExportTransform) -> DecodedImage {
    if transform.is_identity() {
        return image.clone();
    }
    let cropped = apply_crop(image, &transform.crop);
    let flipped = apply_flip(&cropped, transform.flip);
    apply_rotation(&flipped, transform.rotation)
}

/// Image whose channel values encode the pixel position.
#[cfg(test)]
pub(crate) fn test_image(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = ((y * width + x) % 256) as u8;
            pixels.extend_from_slice(&[v, x as u8, y as u8]);
        }
    }
    DecodedImage::new(width, height, pixels)
}
