//! Offset clamping and conversion between display offsets and normalized
//! crop rectangles.
//!
//! [`calculate_normalized_crop_rect`] and the pair
//! [`offset_from_normalized_rect`] / [`crop_size_from_normalized_rect`] are
//! exact algebraic inverses for any in-bounds rectangle, so a persisted rect
//! survives load and save unchanged up to floating-point precision.

use super::{NormalizedCropRect, Offset, Size};

/// Constrain `offset` so the crop box never leaves the displayed image.
///
/// Each axis is clamped independently to `[-max, +max]` where
/// `max = max(0, (image - box) / 2)`.
pub fn clamp_offset(offset: Offset, displayed_image: Size, crop_box: Size) -> Offset {
    let max_x = ((displayed_image.width - crop_box.width) / 2.0).max(0.0);
    let max_y = ((displayed_image.height - crop_box.height) / 2.0).max(0.0);

    Offset::new(
        offset.x.max(-max_x).min(max_x),
        offset.y.max(-max_y).min(max_y),
    )
}

/// Express the crop box as a fraction of the displayed image.
///
/// The box centre in normalized coordinates is `0.5 - offset / image`; the
/// top-left is the centre minus half the normalized size, clamped so the
/// rectangle stays inside `[0, 1]`. Width and height are capped at 1.
///
/// Returns `fallback` when the displayed image or the crop box is degenerate.
pub fn calculate_normalized_crop_rect(
    offset: Offset,
    displayed_image: Size,
    crop_box: Size,
    fallback: NormalizedCropRect,
) -> NormalizedCropRect {
    if !displayed_image.is_positive() || !crop_box.is_positive() {
        return fallback;
    }

    let width = (crop_box.width / displayed_image.width).min(1.0);
    let height = (crop_box.height / displayed_image.height).min(1.0);

    let center_x = 0.5 - offset.x / displayed_image.width;
    let center_y = 0.5 - offset.y / displayed_image.height;

    let x = (center_x - width / 2.0).max(0.0).min(1.0 - width);
    let y = (center_y - height / 2.0).max(0.0).min(1.0 - height);

    NormalizedCropRect {
        x,
        y,
        width,
        height,
    }
}

/// Inverse of [`calculate_normalized_crop_rect`] for the image offset:
/// `offset = -(center - 0.5) * displayed`.
pub fn offset_from_normalized_rect(rect: &NormalizedCropRect, displayed_image: Size) -> Offset {
    Offset::new(
        -(rect.center_x() - 0.5) * displayed_image.width,
        -(rect.center_y() - 0.5) * displayed_image.height,
    )
}

/// Inverse of [`calculate_normalized_crop_rect`] for the crop box size.
pub fn crop_size_from_normalized_rect(rect: &NormalizedCropRect, displayed_image: Size) -> Size {
    Size::new(
        rect.width * displayed_image.width,
        rect.height * displayed_image.height,
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for positive displayed image sizes.
    fn displayed_strategy() -> impl Strategy<Value = Size> {
        (1.0f64..=4000.0, 1.0f64..=4000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    /// Strategy for in-bounds normalized rectangles.
    fn rect_strategy() -> impl Strategy<Value = NormalizedCropRect> {
        (0.01f64..=1.0, 0.01f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(w, h, fx, fy)| {
            NormalizedCropRect {
                x: fx * (1.0 - w),
                y: fy * (1.0 - h),
                width: w,
                height: h,
            }
        })
    }

    proptest! {
        /// Property: rect -> (offset, size) -> rect is lossless.
        #[test]
        fn prop_round_trip_is_lossless(
            displayed in displayed_strategy(),
            rect in rect_strategy(),
        ) {
            let offset = offset_from_normalized_rect(&rect, displayed);
            let size = crop_size_from_normalized_rect(&rect, displayed);
            let back = calculate_normalized_crop_rect(offset, displayed, size, NormalizedCropRect::FULL);

            prop_assert!((back.x - rect.x).abs() < 1e-6, "x: {} vs {}", back.x, rect.x);
            prop_assert!((back.y - rect.y).abs() < 1e-6, "y: {} vs {}", back.y, rect.y);
            prop_assert!((back.width - rect.width).abs() < 1e-6);
            prop_assert!((back.height - rect.height).abs() < 1e-6);
        }

        /// Property: clamping twice equals clamping once.
        #[test]
        fn prop_clamp_is_idempotent(
            x in -10000.0f64..=10000.0,
            y in -10000.0f64..=10000.0,
            displayed in displayed_strategy(),
            (bw, bh) in (0.0f64..=4000.0, 0.0f64..=4000.0),
        ) {
            let crop_box = Size::new(bw, bh);
            let once = clamp_offset(Offset::new(x, y), displayed, crop_box);
            let twice = clamp_offset(once, displayed, crop_box);
            prop_assert_eq!(once, twice);
        }

        /// Property: after clamping, a box no larger than the image lies
        /// fully inside the image extent.
        #[test]
        fn prop_clamped_box_contained(
            x in -10000.0f64..=10000.0,
            y in -10000.0f64..=10000.0,
            displayed in displayed_strategy(),
            (fw, fh) in (0.01f64..=1.0, 0.01f64..=1.0),
        ) {
            let crop_box = Size::new(displayed.width * fw, displayed.height * fh);
            let offset = clamp_offset(Offset::new(x, y), displayed, crop_box);

            // Box edges relative to the image centre
            let left = -crop_box.width / 2.0 - offset.x;
            let right = crop_box.width / 2.0 - offset.x;
            let top = -crop_box.height / 2.0 - offset.y;
            let bottom = crop_box.height / 2.0 - offset.y;

            let eps = 1e-9 * displayed.width.max(displayed.height);
            prop_assert!(left >= -displayed.width / 2.0 - eps);
            prop_assert!(right <= displayed.width / 2.0 + eps);
            prop_assert!(top >= -displayed.height / 2.0 - eps);
            prop_assert!(bottom <= displayed.height / 2.0 + eps);
        }

        /// Property: every computed rect satisfies the persisted contract.
        #[test]
        fn prop_computed_rect_is_valid(
            x in -10000.0f64..=10000.0,
            y in -10000.0f64..=10000.0,
            displayed in displayed_strategy(),
            (bw, bh) in (0.1f64..=8000.0, 0.1f64..=8000.0),
        ) {
            let rect = calculate_normalized_crop_rect(
                Offset::new(x, y),
                displayed,
                Size::new(bw, bh),
                NormalizedCropRect::FULL,
            );
            prop_assert!(rect.validate().is_ok(), "invalid rect {:?}", rect);
        }
    }
}
