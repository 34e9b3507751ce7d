//! Geometry primitives and pure functions used by the crop engine.
//!
//! Everything in this module is side-effect free: functions take explicit
//! inputs and return new values. Zero-sized inputs never panic or divide by
//! zero; they produce a degenerate (zero or fallback) result instead, and the
//! caller is expected to gate on readiness.
//!
//! # Coordinate Spaces
//!
//! - **Screen space**: container pixels, origin at the container's top-left.
//! - **Display space**: pixels relative to the container centre. The crop box
//!   is always centred at the origin; the image layer is displaced by an
//!   [`Offset`] and scaled by zoom.
//! - **Normalized crop space**: `[0, 1]` fractions of the displayed (zoomed)
//!   image extent, origin at the image's top-left. This is the only persisted
//!   representation ([`NormalizedCropRect`]).

mod fit;
mod pinch;
mod rect;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fit::{calculate_base_fit_size, calculate_crop_box_size, clamp_crop_size};
pub use pinch::{calculate_new_rotation, calculate_new_zoom, calculate_pinch_gesture, PinchMetrics};
pub use rect::{
    calculate_normalized_crop_rect, clamp_offset, crop_size_from_normalized_rect,
    offset_from_normalized_rect,
};

/// Tolerance used when validating normalized rectangles coming from outside.
const RECT_TOLERANCE: f64 = 1e-6;

/// A non-negative width/height pair in device-independent pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// The degenerate "not ready" size.
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are strictly positive and finite.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width divided by height, or `None` for a degenerate size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.is_positive().then(|| self.width / self.height)
    }

    /// Scale both dimensions by `factor`.
    pub fn scale(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Signed displacement of the image centre from the container centre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    pub fn translate(&self, dx: f64, dy: f64) -> Offset {
        Offset::new(self.x + dx, self.y + dy)
    }
}

/// A pointer position in page (screen) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// An axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` centred on `center`.
    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Mirror flags applied to the image layer and the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
    };

    /// Scale factors (`1.0` or `-1.0`) for a display transform.
    pub fn scale(&self) -> (f64, f64) {
        (
            if self.horizontal { -1.0 } else { 1.0 },
            if self.vertical { -1.0 } else { 1.0 },
        )
    }
}

/// Errors for normalized rectangles that break the `[0, 1]` contract.
#[derive(Debug, Error, PartialEq)]
pub enum CropRectError {
    /// A component is NaN or infinite.
    #[error("Crop rect contains a non-finite component")]
    NonFinite,

    /// The origin lies outside the unit square.
    #[error("Crop rect origin ({x}, {y}) is outside [0, 1]")]
    OriginOutOfRange { x: f64, y: f64 },

    /// Width or height is zero or negative.
    #[error("Crop rect size {width}x{height} must be positive")]
    EmptySize { width: f64, height: f64 },

    /// The rectangle extends past the right or bottom edge.
    #[error("Crop rect extends past the image edge (right {right}, bottom {bottom})")]
    Overflow { right: f64, bottom: f64 },
}

/// Crop region as fractions of the displayed image extent.
///
/// This four-field `{x, y, width, height}` shape is the persisted contract
/// shared with the settings and export collaborators. It is independent of
/// container size, so the same value drives both the live preview and the
/// high-resolution export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCropRect {
    /// Left edge (0.0 to 1.0)
    pub x: f64,
    /// Top edge (0.0 to 1.0)
    pub y: f64,
    /// Width (0.0 exclusive to 1.0)
    pub width: f64,
    /// Height (0.0 exclusive to 1.0)
    pub height: f64,
}

impl Default for NormalizedCropRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl NormalizedCropRect {
    /// The whole image.
    pub const FULL: NormalizedCropRect = NormalizedCropRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Create a validated rectangle.
    ///
    /// # Errors
    ///
    /// Returns a [`CropRectError`] describing the first violated invariant.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, CropRectError> {
        let rect = Self {
            x,
            y,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Check the `[0, 1]` invariants, allowing a small tolerance for values
    /// that went through floating-point persistence.
    pub fn validate(&self) -> Result<(), CropRectError> {
        let parts = [self.x, self.y, self.width, self.height];
        if parts.iter().any(|v| !v.is_finite()) {
            return Err(CropRectError::NonFinite);
        }
        if self.x < -RECT_TOLERANCE
            || self.y < -RECT_TOLERANCE
            || self.x > 1.0 + RECT_TOLERANCE
            || self.y > 1.0 + RECT_TOLERANCE
        {
            return Err(CropRectError::OriginOutOfRange {
                x: self.x,
                y: self.y,
            });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CropRectError::EmptySize {
                width: self.width,
                height: self.height,
            });
        }
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        if right > 1.0 + RECT_TOLERANCE || bottom > 1.0 + RECT_TOLERANCE {
            return Err(CropRectError::Overflow { right, bottom });
        }
        Ok(())
    }

    /// Horizontal centre in normalized coordinates.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical centre in normalized coordinates.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// True when the rectangle covers the whole image (within `tolerance`).
    pub fn is_full(&self, tolerance: f64) -> bool {
        self.x.abs() < tolerance
            && self.y.abs() < tolerance
            && (self.width - 1.0).abs() < tolerance
            && (self.height - 1.0).abs() < tolerance
    }
}

/// Returns the ratio when it can be used as a fixed aspect ratio.
///
/// Zero, negative and non-finite ratios mean "free-form".
#[inline]
pub(crate) fn usable_ratio(ratio: Option<f64>) -> Option<f64> {
    ratio.filter(|r| r.is_finite() && *r > 0.0)
}

/// Clamp that never panics, even when `lo > hi` (the upper bound wins).
#[inline]
pub(crate) fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}
