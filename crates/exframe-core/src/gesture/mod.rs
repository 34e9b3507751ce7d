//! Pointer gesture recognition for the crop view.
//!
//! Two independent gesture surfaces exist:
//!
//! - **Image surface** ([`ImageGesture`]): single-finger pan and two-finger
//!   pinch/twist/pan, modelled as an explicit [`ImageGestureState`].
//! - **Corner surfaces** ([`CornerResponder`], one per [`Corner`]): resize the
//!   crop box. They claim a touch before the image surface sees it.
//!
//! Recognizers hold only their own gesture snapshot. Current external state
//! (zoom, rotation, aspect ratio) is passed in as [`GestureInputs`] on every
//! call, and the store is only ever changed through its setters.
//!
//! Every callback runs to completion before the next pointer event, so the
//! store is consistent after each processed move. A terminated gesture simply
//! leaves the last move's state in place.

mod corner;
mod image;

use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedCropRect;

pub use corner::{resize_crop_box, Corner, CornerResponder};
pub use image::{ImageGesture, ImageGestureState, PinchTracker};

/// Externally owned values a gesture reads at call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureInputs {
    /// Current zoom
    pub zoom: f64,
    /// Current rotation in whole degrees, `[0, 360)`
    pub rotation: f64,
    /// Fixed aspect ratio, `None` for free-form
    pub aspect_ratio: Option<f64>,
}

/// Output of the crop engine for the hosting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CropEvent {
    /// A committed crop rect (gesture release, aspect change, initial default)
    CropChanged(NormalizedCropRect),
    /// Live zoom update during a two-finger gesture
    ZoomChanged(f64),
    /// Live rotation update during a two-finger gesture
    RotationChanged(f64),
}
