//! Exframe WASM - WebAssembly bindings for the Exframe crop engine
//!
//! This crate exposes exframe-core to the JavaScript editor: the interactive
//! crop view, image decoding with EXIF metadata, and the export transforms.
//!
//! # Module Structure
//!
//! - `cropper` - Interactive crop view (`JsCropper`)
//! - `decode` - Dimension probing, decoding and EXIF metadata
//! - `transform` - Crop, flip and rotation of decoded pixels
//! - `types` - WASM-compatible wrapper types for image data
//! - `logger` - `log` output routed to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropper, decode_image, render_export } from '@exframe/wasm';
//!
//! await init();
//!
//! const cropper = new JsCropper(undefined, undefined);
//! cropper.set_on_crop_change((rect) => settings.setCrop(rect));
//!
//! // On export
//! const framed = render_export(decode_image(bytes), cropper.export_transform());
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod decode;
mod logger;
mod transform;
mod types;

// Re-export public types
pub use cropper::JsCropper;
pub use decode::{decode_image, probe_dimensions, read_metadata};
pub use logger::set_log_level;
pub use transform::{apply_crop, apply_flip, apply_rotation, render_export};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
