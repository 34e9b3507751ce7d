//! Mirroring decoded pixels.

use crate::decode::DecodedImage;
use crate::geometry::Flip;

/// Mirror `image` horizontally and/or vertically.
pub fn apply_flip(image: &DecodedImage, flip: Flip) -> DecodedImage {
    if !image.is_valid() || (!flip.horizontal && !flip.vertical) {
        return image.clone();
    }

    let (width, height) = (image.width, image.height);
    let mut pixels = Vec::with_capacity(image.pixels.len());

    for y in 0..height {
        let src_y = if flip.vertical { height - 1 - y } else { y };
        for x in 0..width {
            let src_x = if flip.horizontal { width - 1 - x } else { x };
            pixels.extend_from_slice(&image.pixel(src_x, src_y));
        }
    }

    DecodedImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_image;

    const HORIZONTAL: Flip = Flip {
        horizontal: true,
        vertical: false,
    };
    const VERTICAL: Flip = Flip {
        horizontal: false,
        vertical: true,
    };

    #[test]
    fn test_no_flip_is_copy() {
        let img = test_image(3, 2);
        assert_eq!(apply_flip(&img, Flip::NONE), img);
    }

    #[test]
    fn test_horizontal() {
        let img = test_image(3, 2);
        let result = apply_flip(&img, HORIZONTAL);
        assert_eq!(result.pixel(0, 0), img.pixel(2, 0));
        assert_eq!(result.pixel(2, 1), img.pixel(0, 1));
    }

    #[test]
    fn test_vertical() {
        let img = test_image(3, 2);
        let result = apply_flip(&img, VERTICAL);
        assert_eq!(result.pixel(1, 0), img.pixel(1, 1));
    }

    #[test]
    fn test_both_is_half_turn() {
        let img = test_image(4, 3);
        let both = Flip {
            horizontal: true,
            vertical: true,
        };
        assert_eq!(apply_flip(&img, both), crate::transform::apply_rotation(&img, 180.0));
    }

    #[test]
    fn test_twice_is_identity() {
        let img = test_image(5, 4);
        assert_eq!(apply_flip(&apply_flip(&img, HORIZONTAL), HORIZONTAL), img);
        assert_eq!(apply_flip(&apply_flip(&img, VERTICAL), VERTICAL), img);
    }
}
