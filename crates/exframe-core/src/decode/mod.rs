//! Image source boundary.
//!
//! The crop view only needs the natural size of the image; the export path
//! needs oriented pixels; the watermark border needs camera EXIF. All three
//! read the same bytes:
//!
//! - [`probe_dimensions`] reads the header and EXIF orientation only
//! - [`decode_image`] produces oriented RGB8 pixels
//! - [`read_metadata`] collects camera, lens and exposure values
//!
//! Sizes reported here are always *after* EXIF orientation, so the preview
//! and the export agree on what a [`NormalizedCropRect`] refers to.
//!
//! [`NormalizedCropRect`]: crate::geometry::NormalizedCropRect

mod source;
mod types;

pub use source::{decode_image, probe_dimensions, read_metadata, read_orientation};
pub use types::{DecodeError, DecodedImage, ImageMetadata, Orientation};
