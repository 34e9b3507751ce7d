//! Export transform bindings.
//!
//! The crop view hands out its export transform as a plain object; feed it to
//! [`render_export`] together with the decoded original to get the final
//! framed pixels.
//!
//! ```typescript
//! const original = decode_image(bytes);
//! const framed = render_export(original, cropper.export_transform());
//! ```

use exframe_core::transform::{self, ExportTransform};
use exframe_core::{Flip, NormalizedCropRect};
use wasm_bindgen::prelude::*;

use crate::types::{from_js, js_error, JsDecodedImage};

/// Crop, flip and rotate in export order. `undefined` leaves the image as is.
#[wasm_bindgen]
pub fn render_export(image: &JsDecodedImage, transform: JsValue) -> Result<JsDecodedImage, JsValue> {
    let transform: ExportTransform = from_js(transform, "export transform")?.unwrap_or_default();
    transform.crop.validate().map_err(js_error)?;
    Ok(JsDecodedImage::from_decoded(transform::render_export(
        image.decoded(),
        &transform,
    )))
}

/// Crop to a normalized rect (fractions of width and height).
///
/// # Errors
///
/// Returns an error if the rect leaves `[0, 1]` or has no area.
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsDecodedImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<JsDecodedImage, JsValue> {
    let rect = NormalizedCropRect::new(x, y, width, height).map_err(js_error)?;
    Ok(JsDecodedImage::from_decoded(transform::apply_crop(
        image.decoded(),
        &rect,
    )))
}

#[wasm_bindgen]
pub fn apply_flip(image: &JsDecodedImage, horizontal: bool, vertical: bool) -> JsDecodedImage {
    let flip = Flip {
        horizontal,
        vertical,
    };
    JsDecodedImage::from_decoded(transform::apply_flip(image.decoded(), flip))
}

/// Rotate clockwise by `degrees`. Quarter turns are exact; other angles
/// expand the canvas and fill the corners with black.
#[wasm_bindgen]
pub fn apply_rotation(image: &JsDecodedImage, degrees: f64) -> JsDecodedImage {
    JsDecodedImage::from_decoded(transform::apply_rotation(image.decoded(), degrees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exframe_core::decode::DecodedImage;

    fn gradient(width: u32, height: u32) -> JsDecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(y * width + x) as u8, x as u8, y as u8]);
            }
        }
        JsDecodedImage::from_decoded(DecodedImage::new(width, height, pixels))
    }

    #[test]
    fn test_apply_crop_half() {
        let cropped = apply_crop(&gradient(10, 8), 0.5, 0.0, 0.5, 0.5).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (5, 4));
        // First pixel is source (5, 0)
        assert_eq!(&cropped.pixels()[..3], &[5, 5, 0]);
    }

    #[test]
    fn test_apply_flip_horizontal() {
        let flipped = apply_flip(&gradient(3, 1), true, false);
        assert_eq!(&flipped.pixels()[..3], &[2, 2, 0]);
    }

    #[test]
    fn test_apply_rotation_quarter_turn_swaps_size() {
        let rotated = apply_rotation(&gradient(6, 4), 90.0);
        assert_eq!((rotated.width(), rotated.height()), (4, 6));
    }

    #[test]
    fn test_apply_rotation_zero_is_identity() {
        let src = gradient(5, 3);
        let rotated = apply_rotation(&src, 0.0);
        assert_eq!(rotated.pixels(), src.pixels());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn solid(width: u32, height: u32) -> JsDecodedImage {
        JsDecodedImage::new(width, height, vec![128; (width * height * 3) as usize]).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_apply_crop_rejects_out_of_range() {
        assert!(apply_crop(&solid(4, 4), 0.8, 0.0, 0.5, 0.5).is_err());
    }

    #[wasm_bindgen_test]
    fn test_render_export_undefined_is_identity() {
        let out = render_export(&solid(4, 3), JsValue::UNDEFINED).unwrap();
        assert_eq!((out.width(), out.height()), (4, 3));
    }

    #[wasm_bindgen_test]
    fn test_render_export_applies_crop_and_quarter_turn() {
        let transform = serde_wasm_bindgen::to_value(&ExportTransform {
            crop: NormalizedCropRect::new(0.0, 0.0, 0.5, 1.0).unwrap(),
            rotation: 90.0,
            flip: Flip::NONE,
        })
        .unwrap();
        let out = render_export(&solid(8, 6), transform).unwrap();
        assert_eq!((out.width(), out.height()), (6, 4));
    }
}
