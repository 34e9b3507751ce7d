//! Image decoding and EXIF bindings.
//!
//! - [`probe_dimensions`] - oriented size from the header, for the crop view
//! - [`decode_image`] - full decode with EXIF orientation applied
//! - [`read_metadata`] - camera fields for the watermark border
//!
//! # Example
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const { width, height } = probe_dimensions(bytes);
//! cropper.image_loaded(width, height);
//!
//! const meta = read_metadata(bytes);
//! border.setCaption(meta.cameraLine, meta.exposureLine);
//! ```

use exframe_core::decode::{self, ImageMetadata};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{js_error, to_js, JsDecodedImage};

/// Metadata as seen by JavaScript: the raw fields plus the formatted
/// caption lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataView {
    #[serde(flatten)]
    metadata: ImageMetadata,
    camera_line: Option<String>,
    exposure_line: Option<String>,
}

impl From<ImageMetadata> for MetadataView {
    fn from(metadata: ImageMetadata) -> Self {
        Self {
            camera_line: metadata.camera_line(),
            exposure_line: metadata.exposure_line(),
            metadata,
        }
    }
}

/// Displayed `{ width, height }` of an encoded image, with EXIF orientation
/// taken into account. Only the header is read.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let size = decode::probe_dimensions(bytes).map_err(js_error)?;
    to_js(&size)
}

/// Decode a JPEG or PNG and apply its EXIF orientation.
///
/// # Errors
///
/// Returns an error if the format is not recognised, the data is corrupted
/// or the image has no pixels.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    let decoded = decode::decode_image(bytes).map_err(js_error)?;
    Ok(JsDecodedImage::from_decoded(decoded))
}

/// Camera metadata. Files without EXIF give an object with every field
/// unset rather than an error.
#[wasm_bindgen]
pub fn read_metadata(bytes: &[u8]) -> Result<JsValue, JsValue> {
    to_js(&MetadataView::from(decode::read_metadata(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_view_adds_caption_lines() {
        let view = MetadataView::from(ImageMetadata {
            camera_make: Some("FUJIFILM".to_string()),
            camera_model: Some("X-T5".to_string()),
            focal_length: Some(35.0),
            f_number: Some(2.0),
            exposure_time: Some(0.004),
            iso: Some(200),
            ..ImageMetadata::default()
        });

        assert_eq!(view.camera_line.as_deref(), Some("FUJIFILM X-T5"));
        assert_eq!(view.exposure_line.as_deref(), Some("35mm f/2 1/250s ISO200"));
        assert_eq!(view.metadata.iso, Some(200));
    }

    #[test]
    fn test_metadata_view_empty() {
        let view = MetadataView::from(ImageMetadata::default());
        assert_eq!(view.camera_line, None);
        assert_eq!(view.exposure_line, None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_probe_rejects_garbage() {
        assert!(probe_dimensions(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_metadata_of_garbage_is_empty_object() {
        let value = read_metadata(&[0x00, 0x01, 0x02, 0x03]).unwrap();
        assert!(value.is_object());
    }
}
