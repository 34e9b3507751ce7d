//! Corner handle resizing of the crop box.
//!
//! The crop box stays centred in the container while it is resized; the image
//! offset moves by half the size change so the corner opposite the dragged
//! one keeps covering the same image content.

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::geometry::{clamp_crop_size, usable_ratio, Offset, Point, Size};
use crate::store::CropStore;

use super::{CropEvent, GestureInputs};

/// One of the four crop box corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Sign applied to the raw drag vector so that dragging away from the
    /// centre grows the box. Left and top corners invert their axis.
    #[inline]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

/// Compute the resized crop box for a drag of `(dx, dy)` on `corner`.
///
/// Under a fixed aspect ratio the dominant axis (after scaling the vertical
/// delta by the ratio) drives the size and the other axis is derived from it.
/// The result is clamped to `[min_size, max_size]` per axis; with a fixed
/// ratio the clamp-and-rederive step runs twice, which settles both axes in
/// all but degenerate cases (see the aspect lock note in `DESIGN.md`). The
/// ratio itself always holds exactly.
pub fn resize_crop_box(
    corner: Corner,
    start_size: Size,
    dx: f64,
    dy: f64,
    aspect_ratio: Option<f64>,
    min_size: f64,
    max_size: Size,
) -> Size {
    let (sign_w, sign_h) = corner.signs();
    let delta_w = dx * sign_w;
    let delta_h = dy * sign_h;

    let proposed = match usable_ratio(aspect_ratio) {
        Some(ratio) if delta_w.abs() >= (delta_h * ratio).abs() => {
            let width = start_size.width + delta_w;
            Size::new(width, width / ratio)
        }
        Some(ratio) => {
            let height = start_size.height + delta_h;
            Size::new(height * ratio, height)
        }
        None => Size::new(start_size.width + delta_w, start_size.height + delta_h),
    };
    clamp_crop_size(proposed, aspect_ratio, min_size, max_size)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CornerSnapshot {
    start_page: Point,
    start_size: Size,
    start_offset: Offset,
}

/// Resize responder bound to a single corner handle.
#[derive(Debug, Clone)]
pub struct CornerResponder {
    corner: Corner,
    snapshot: Option<CornerSnapshot>,
}

impl CornerResponder {
    pub fn new(corner: Corner) -> Self {
        Self {
            corner,
            snapshot: None,
        }
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Claim a touch at `page` and snapshot the current box and offset.
    pub fn grant(&mut self, page: Point, store: &CropStore, inputs: &GestureInputs) {
        self.snapshot = Some(CornerSnapshot {
            start_page: page,
            start_size: store.crop_box_size(inputs.aspect_ratio),
            start_offset: store.image_offset(),
        });
        log::debug!("corner {:?} granted", self.corner);
    }

    /// Resize for the pointer now at `page`.
    pub fn update(
        &mut self,
        page: Point,
        store: &mut CropStore,
        inputs: &GestureInputs,
        config: &CropConfig,
    ) {
        let Some(snapshot) = self.snapshot else {
            return;
        };

        let size = resize_crop_box(
            self.corner,
            snapshot.start_size,
            page.x - snapshot.start_page.x,
            page.y - snapshot.start_page.y,
            inputs.aspect_ratio,
            config.min_crop_size,
            store.max_crop_size(inputs.zoom),
        );

        let (sign_w, sign_h) = self.corner.signs();
        let offset = snapshot.start_offset.translate(
            -sign_w * (size.width - snapshot.start_size.width) / 2.0,
            -sign_h * (size.height - snapshot.start_size.height) / 2.0,
        );

        store.set_custom_crop_size(Some(size));
        store.set_image_offset(store.clamp_image_offset(offset, inputs.zoom, size));
    }

    /// End the drag and commit the crop rect.
    pub fn release(&mut self, store: &CropStore, inputs: &GestureInputs) -> Vec<CropEvent> {
        if self.snapshot.take().is_none() {
            return Vec::new();
        }
        let crop = store.crop_box_size(inputs.aspect_ratio);
        log::debug!("corner {:?} released with box {:?}", self.corner, crop);

        vec![CropEvent::CropChanged(store.calculate_crop_rect(
            store.image_offset(),
            inputs.zoom,
            crop,
        ))]
    }

    /// Drop the drag without committing.
    pub fn terminate(&mut self) {
        self.snapshot = None;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn corner_strategy() -> impl Strategy<Value = Corner> {
        prop_oneof![
            Just(Corner::TopLeft),
            Just(Corner::TopRight),
            Just(Corner::BottomLeft),
            Just(Corner::BottomRight),
        ]
    }

    proptest! {
        /// Property: a fixed aspect ratio survives any single resize move.
        #[test]
        fn prop_aspect_lock_holds(
            corner in corner_strategy(),
            ratio in 0.2f64..=5.0,
            start_w in 50.0f64..=400.0,
            dx in -1000.0f64..=1000.0,
            dy in -1000.0f64..=1000.0,
            (max_w, max_h) in (60.0f64..=2000.0, 60.0f64..=2000.0),
        ) {
            let start = Size::new(start_w, start_w / ratio);
            let size = resize_crop_box(
                corner,
                start,
                dx,
                dy,
                Some(ratio),
                50.0,
                Size::new(max_w, max_h),
            );
            prop_assert!(size.height > 0.0);
            prop_assert!(
                (size.width / size.height - ratio).abs() < 1e-3,
                "ratio {} vs {}",
                size.width / size.height,
                ratio
            );
        }

        /// Property: free-form resizing stays within [min, max] per axis.
        #[test]
        fn prop_free_form_bounds(
            corner in corner_strategy(),
            (start_w, start_h) in (50.0f64..=400.0, 50.0f64..=400.0),
            dx in -1000.0f64..=1000.0,
            dy in -1000.0f64..=1000.0,
            (max_w, max_h) in (50.0f64..=2000.0, 50.0f64..=2000.0),
        ) {
            let size = resize_crop_box(
                corner,
                Size::new(start_w, start_h),
                dx,
                dy,
                None,
                50.0,
                Size::new(max_w, max_h),
            );
            prop_assert!(size.width >= 50.0 && size.width <= max_w);
            prop_assert!(size.height >= 50.0 && size.height <= max_h);
        }
    }
}
