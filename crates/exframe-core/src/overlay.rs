//! Drawable geometry for the crop overlay.
//!
//! Everything here is derived from the container size, the crop box size and
//! the image layer state; nothing is stored between frames and no gesture
//! handling happens here. The host draws the rectangles and positions the
//! corner responders on the handle hit targets.

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::gesture::Corner;
use crate::geometry::{Flip, Offset, Point, Rect, Size};

/// A straight line in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// A corner handle: visible L-shaped mark plus a larger touch target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerHandle {
    pub corner: Corner,
    /// Corner point of the crop box
    pub anchor: Point,
    /// Square touch target centred on the anchor
    pub hit_rect: Rect,
    /// Horizontal and vertical arms of the visible mark
    pub arms: [Segment; 2],
}

/// Full overlay layout for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    /// Crop box in container coordinates
    pub crop_box: Rect,
    /// Dimming bands outside the box: top, bottom, left, right
    pub masks: [Rect; 4],
    /// Border thickness around `crop_box`
    pub border_width: f64,
    /// Rule-of-thirds lines: two vertical, then two horizontal
    pub grid_lines: [Segment; 4],
    pub handles: [CornerHandle; 4],
}

impl OverlayLayout {
    /// Lay out the overlay for a crop box centred in `container`.
    ///
    /// Returns `None` while either size is degenerate.
    pub fn compute(container: Size, crop_box: Size, config: &CropConfig) -> Option<Self> {
        if !container.is_positive() || !crop_box.is_positive() {
            return None;
        }

        let center = Point::new(container.width / 2.0, container.height / 2.0);
        let bx = Rect::from_center(center, crop_box);

        let masks = [
            Rect::new(0.0, 0.0, container.width, bx.y.max(0.0)),
            Rect::new(
                0.0,
                bx.bottom(),
                container.width,
                (container.height - bx.bottom()).max(0.0),
            ),
            Rect::new(0.0, bx.y, bx.x.max(0.0), bx.height),
            Rect::new(
                bx.right(),
                bx.y,
                (container.width - bx.right()).max(0.0),
                bx.height,
            ),
        ];

        let third_w = bx.width / 3.0;
        let third_h = bx.height / 3.0;
        let grid_lines = [
            Segment::new(
                Point::new(bx.x + third_w, bx.y),
                Point::new(bx.x + third_w, bx.bottom()),
            ),
            Segment::new(
                Point::new(bx.x + 2.0 * third_w, bx.y),
                Point::new(bx.x + 2.0 * third_w, bx.bottom()),
            ),
            Segment::new(
                Point::new(bx.x, bx.y + third_h),
                Point::new(bx.right(), bx.y + third_h),
            ),
            Segment::new(
                Point::new(bx.x, bx.y + 2.0 * third_h),
                Point::new(bx.right(), bx.y + 2.0 * third_h),
            ),
        ];

        let handles = Corner::ALL.map(|corner| corner_handle(corner, &bx, config));

        Some(Self {
            crop_box: bx,
            masks,
            border_width: config.border_width,
            grid_lines,
            handles,
        })
    }

    /// The corner whose touch target contains `point`. When targets overlap
    /// on a tiny box the nearest anchor wins.
    pub fn handle_at(&self, point: Point) -> Option<Corner> {
        self.handles
            .iter()
            .filter(|handle| handle.hit_rect.contains(point))
            .min_by(|a, b| {
                a.anchor
                    .distance_to(point)
                    .total_cmp(&b.anchor.distance_to(point))
            })
            .map(|handle| handle.corner)
    }
}

fn corner_handle(corner: Corner, bx: &Rect, config: &CropConfig) -> CornerHandle {
    let (sign_x, sign_y) = corner.signs();
    let anchor = Point::new(
        if sign_x < 0.0 { bx.x } else { bx.right() },
        if sign_y < 0.0 { bx.y } else { bx.bottom() },
    );

    // Arms point back into the box
    let arm = config.handle_mark_length.min(bx.width / 2.0).min(bx.height / 2.0);
    let arms = [
        Segment::new(anchor, Point::new(anchor.x - sign_x * arm, anchor.y)),
        Segment::new(anchor, Point::new(anchor.x, anchor.y - sign_y * arm)),
    ];

    CornerHandle {
        corner,
        anchor,
        hit_rect: Rect::from_center(
            anchor,
            Size::new(config.handle_hit_size, config.handle_hit_size),
        ),
        arms,
    }
}

/// Placement of the image layer under the crop box.
///
/// Flip and rotation pivot on the crop box centre, so the box shows the
/// flipped and rotated content of the crop rect. This is the same result the
/// export path produces by cropping first and transforming afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayerTransform {
    /// Image frame at the current zoom, in container coordinates. Rotation
    /// and scale are applied about its centre.
    pub frame: Rect,
    /// Clockwise rotation in whole degrees
    pub rotation: f64,
    /// `-1.0` when flipped horizontally
    pub scale_x: f64,
    /// `-1.0` when flipped vertically
    pub scale_y: f64,
}

impl ImageLayerTransform {
    pub fn compute(
        container: Size,
        image_display: Size,
        offset: Offset,
        rotation: f64,
        flip: Flip,
    ) -> Option<Self> {
        if !container.is_positive() || !image_display.is_positive() {
            return None;
        }
        let (scale_x, scale_y) = flip.scale();

        // Mirror, then rotate the offset about the box centre
        let (sin, cos) = rotation.to_radians().sin_cos();
        let fx = offset.x * scale_x;
        let fy = offset.y * scale_y;
        let center = Point::new(
            container.width / 2.0 + fx * cos - fy * sin,
            container.height / 2.0 + fx * sin + fy * cos,
        );

        Some(Self {
            frame: Rect::from_center(center, image_display),
            rotation,
            scale_x,
            scale_y,
        })
    }
}
