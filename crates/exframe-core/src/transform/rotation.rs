//! Rotating decoded pixels.
//!
//! Angles are clockwise degrees, matching the on-screen image layer. Quarter
//! turns are exact pixel permutations. Any other angle is resampled with
//! bilinear interpolation through inverse mapping onto a canvas expanded to
//! hold the whole rotated image; uncovered canvas is black.
//!
//! For a clockwise turn by θ in y-down coordinates the inverse map is:
//! ```text
//! src_x =  dst_x * cos(θ) + dst_y * sin(θ)
//! src_y = -dst_x * sin(θ) + dst_y * cos(θ)
//! ```
//! with both points taken relative to their image centres.

use crate::decode::DecodedImage;

/// Angles this close to a multiple of 90 degrees are treated as quarter turns.
const QUARTER_TURN_TOLERANCE: f64 = 1e-6;

/// Number of clockwise quarter turns when `degrees` is a multiple of 90.
fn quarter_turns(degrees: f64) -> Option<u32> {
    let normalized = degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < QUARTER_TURN_TOLERANCE {
        Some(turns as u32 % 4)
    } else {
        None
    }
}

/// Size of the canvas that holds a `width x height` image rotated by
/// `degrees`.
pub fn compute_rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    match quarter_turns(degrees) {
        Some(1) | Some(3) => (height, width),
        Some(_) => (width, height),
        None => {
            let (sin, cos) = degrees.to_radians().sin_cos();
            let (sin, cos) = (sin.abs(), cos.abs());
            let (w, h) = (width as f64, height as f64);
            (
                ((w * cos + h * sin).round() as u32).max(1),
                ((w * sin + h * cos).round() as u32).max(1),
            )
        }
    }
}

/// Rotate `image` clockwise by `degrees` about its centre.
pub fn apply_rotation(image: &DecodedImage, degrees: f64) -> DecodedImage {
    if !degrees.is_finite() || !image.is_valid() {
        return image.clone();
    }
    match quarter_turns(degrees) {
        Some(0) => image.clone(),
        Some(turns) => rotate_quarters(image, turns),
        None => rotate_bilinear(image, degrees),
    }
}

fn rotate_quarters(image: &DecodedImage, turns: u32) -> DecodedImage {
    let (w, h) = (image.width, image.height);
    let (out_w, out_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };
    let mut pixels = Vec::with_capacity(image.pixels.len());

    for y in 0..out_h {
        for x in 0..out_w {
            let (src_x, src_y) = match turns {
                1 => (y, h - 1 - x),
                2 => (w - 1 - x, h - 1 - y),
                _ => (w - 1 - y, x),
            };
            pixels.extend_from_slice(&image.pixel(src_x, src_y));
        }
    }

    DecodedImage {
        width: out_w,
        height: out_h,
        pixels,
    }
}

fn rotate_bilinear(image: &DecodedImage, degrees: f64) -> DecodedImage {
    let (out_w, out_h) = compute_rotated_bounds(image.width, image.height, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = out_w as f64 / 2.0;
    let dst_cy = out_h as f64 / 2.0;

    let mut pixels = Vec::with_capacity((out_w as usize) * (out_h as usize) * 3);
    for y in 0..out_h {
        // Sample at pixel centres
        let dy = y as f64 + 0.5 - dst_cy;
        for x in 0..out_w {
            let dx = x as f64 + 0.5 - dst_cx;
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;
            pixels.extend_from_slice(&sample_bilinear(image, src_x, src_y));
        }
    }

    log::debug!(
        "rotated {}x{} by {} degrees onto {}x{}",
        image.width,
        image.height,
        degrees,
        out_w,
        out_h
    );
    DecodedImage {
        width: out_w,
        height: out_h,
        pixels,
    }
}

/// Bilinear sample at pixel-index coordinates. Points more than half a
/// pixel outside the image are black; edge pixels are extended up to that.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let max_x = image.width as f64 - 1.0;
    let max_y = image.height as f64 - 1.0;
    if x < -0.5 || y < -0.5 || x > max_x + 0.5 || y > max_y + 0.5 {
        return [0, 0, 0];
    }

    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut out = [0u8; 3];
    for (c, value) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
