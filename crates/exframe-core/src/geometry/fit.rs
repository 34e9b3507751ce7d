//! Fit sizing for the image layer and the crop box.

use super::{clamp_between, usable_ratio, Size};

/// Scale `image` to fit inside `container` shrunk by `edge_padding` on every
/// side, preserving the image's aspect ratio.
///
/// When the image is wider than the available area its width is maxed and
/// the height derived from it; otherwise the height is maxed.
///
/// # Returns
///
/// The base-fit size (zoom = 1), or [`Size::ZERO`] when any input dimension
/// is zero, which callers treat as "not ready".
pub fn calculate_base_fit_size(container: Size, image: Size, edge_padding: f64) -> Size {
    let padding = edge_padding.max(0.0) * 2.0;
    let available = Size::new(container.width - padding, container.height - padding);

    let (Some(image_ratio), Some(available_ratio)) = (image.aspect_ratio(), available.aspect_ratio())
    else {
        return Size::ZERO;
    };

    if image_ratio > available_ratio {
        Size::new(available.width, available.width / image_ratio)
    } else {
        Size::new(available.height * image_ratio, available.height)
    }
}

/// Size of the crop box inside a base-fit image.
///
/// - Fixed `aspect_ratio`: the largest box with that ratio inside `base_fit`.
/// - Free-form with a `previous_aspect_ratio`: the box the previous ratio
///   produced, so switching to free-form does not snap back to full fit.
/// - Free-form with no history: `base_fit` itself.
pub fn calculate_crop_box_size(
    base_fit: Size,
    aspect_ratio: Option<f64>,
    previous_aspect_ratio: Option<f64>,
) -> Size {
    let Some(fit_ratio) = base_fit.aspect_ratio() else {
        return Size::ZERO;
    };

    match usable_ratio(aspect_ratio).or(usable_ratio(previous_aspect_ratio)) {
        Some(ratio) if fit_ratio > ratio => Size::new(base_fit.height * ratio, base_fit.height),
        Some(ratio) => Size::new(base_fit.width, base_fit.width / ratio),
        None => base_fit,
    }
}

/// Clamp a crop box to `[min_size, max_size]` per axis.
///
/// Under a fixed ratio each axis is clamped and the other re-derived from it,
/// twice, so the ratio holds exactly and the bounds hold except when they
/// cannot both be met.
pub fn clamp_crop_size(size: Size, aspect_ratio: Option<f64>, min_size: f64, max_size: Size) -> Size {
    match usable_ratio(aspect_ratio) {
        Some(ratio) => {
            let (mut width, mut height) = (size.width, size.height);
            for _ in 0..2 {
                width = clamp_between(width, min_size, max_size.width);
                height = width / ratio;
                height = clamp_between(height, min_size, max_size.height);
                width = height * ratio;
            }
            Size::new(width, height)
        }
        None => Size::new(
            clamp_between(size.width, min_size, max_size.width),
            clamp_between(size.height, min_size, max_size.height),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Size, b: Size) -> bool {
        (a.width - b.width).abs() < 1e-9 && (a.height - b.height).abs() < 1e-9
    }

    #[test]
    fn test_base_fit_wide_image_maxes_width() {
        // 360x760 available; 0.75 image ratio is wider than 0.47
        let fit = calculate_base_fit_size(
            Size::new(400.0, 800.0),
            Size::new(1200.0, 1600.0),
            20.0,
        );
        assert!(approx(fit, Size::new(360.0, 480.0)), "got {:?}", fit);
    }

    #[test]
    fn test_base_fit_tall_image_maxes_height() {
        let fit = calculate_base_fit_size(
            Size::new(840.0, 440.0),
            Size::new(1000.0, 1000.0),
            20.0,
        );
        assert!(approx(fit, Size::new(400.0, 400.0)), "got {:?}", fit);
    }

    #[test]
    fn test_base_fit_zero_inputs() {
        let image = Size::new(100.0, 100.0);
        assert_eq!(
            calculate_base_fit_size(Size::ZERO, image, 20.0),
            Size::ZERO
        );
        assert_eq!(
            calculate_base_fit_size(Size::new(400.0, 400.0), Size::new(0.0, 100.0), 20.0),
            Size::ZERO
        );
    }

    #[test]
    fn test_base_fit_padding_swallows_container() {
        // Container smaller than the padding on both sides
        let fit = calculate_base_fit_size(Size::new(30.0, 30.0), Size::new(10.0, 10.0), 20.0);
        assert_eq!(fit, Size::ZERO);
    }

    #[test]
    fn test_crop_box_free_form_is_base_fit() {
        let base = Size::new(360.0, 480.0);
        assert_eq!(calculate_crop_box_size(base, None, None), base);
    }

    #[test]
    fn test_crop_box_square_in_portrait() {
        let base = Size::new(360.0, 480.0);
        let size = calculate_crop_box_size(base, Some(1.0), None);
        assert!(approx(size, Size::new(360.0, 360.0)));
    }

    #[test]
    fn test_crop_box_wide_ratio_in_portrait() {
        let base = Size::new(360.0, 480.0);
        let size = calculate_crop_box_size(base, Some(16.0 / 9.0), None);
        assert!(approx(size, Size::new(360.0, 202.5)));
    }

    #[test]
    fn test_crop_box_tall_ratio_in_landscape() {
        let base = Size::new(480.0, 360.0);
        let size = calculate_crop_box_size(base, Some(0.5), None);
        assert!(approx(size, Size::new(180.0, 360.0)));
    }

    #[test]
    fn test_crop_box_free_form_keeps_previous_ratio() {
        let base = Size::new(360.0, 480.0);
        let size = calculate_crop_box_size(base, None, Some(1.0));
        assert!(approx(size, Size::new(360.0, 360.0)));
    }

    #[test]
    fn test_crop_box_fixed_ratio_wins_over_previous() {
        let base = Size::new(360.0, 480.0);
        let size = calculate_crop_box_size(base, Some(0.75), Some(1.0));
        assert!(approx(size, base));
    }

    #[test]
    fn test_crop_box_degenerate_base() {
        assert_eq!(calculate_crop_box_size(Size::ZERO, Some(1.0), None), Size::ZERO);
    }

    #[test]
    fn test_crop_box_ignores_invalid_ratio() {
        let base = Size::new(360.0, 480.0);
        assert_eq!(calculate_crop_box_size(base, Some(-2.0), None), base);
    }

    #[test]
    fn test_clamp_crop_size_shrinks_ratio_box() {
        // 0.4 box grown at zoom 2, then limited to a 360x480 image
        let size = clamp_crop_size(
            Size::new(304.0, 760.0),
            Some(0.4),
            50.0,
            Size::new(360.0, 480.0),
        );
        assert!(approx(size, Size::new(192.0, 480.0)), "got {:?}", size);
    }

    #[test]
    fn test_clamp_crop_size_free_form_per_axis() {
        let size = clamp_crop_size(Size::new(500.0, 20.0), None, 50.0, Size::new(360.0, 480.0));
        assert_eq!(size, Size::new(360.0, 50.0));
    }

    #[test]
    fn test_clamp_crop_size_inside_bounds_unchanged() {
        let size = Size::new(200.0, 150.0);
        let clamped = clamp_crop_size(size, Some(4.0 / 3.0), 50.0, Size::new(360.0, 480.0));
        assert!(approx(clamped, size), "got {:?}", clamped);
    }
}
