//! Exframe Core - interactive crop engine
//!
//! This crate provides the crop view behind the Exframe photo border editor:
//! the mapping from pan, pinch, twist and corner-drag gestures to a
//! normalized crop rect over a zoomed, panned, rotated image, plus the
//! image-source and export transforms that share that rect.
//!
//! # Coordinate Spaces
//!
//! - **Screen**: container pixels, origin top-left
//! - **Display**: relative to the container centre; the crop box is always
//!   centred and the image is displaced by the pan offset
//! - **Normalized**: `[0, 1]` fractions of the displayed image extent, the
//!   only persisted form ([`NormalizedCropRect`])

pub mod config;
pub mod cropper;
pub mod decode;
pub mod geometry;
pub mod gesture;
pub mod overlay;
pub mod store;
pub mod transform;

pub use config::{ConfigError, CropConfig};
pub use cropper::{CropProps, Cropper};
pub use geometry::{CropRectError, Flip, NormalizedCropRect, Offset, Point, Rect, Size};
pub use gesture::{Corner, CropEvent};
pub use overlay::{ImageLayerTransform, OverlayLayout};
pub use store::{CropGeometry, CropStore};
pub use transform::{render_export, ExportTransform};
