//! Two-finger gesture metrics and the zoom/rotation update rules.

use super::Point;

/// Distance, angle and midpoint of a two-finger touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchMetrics {
    /// Euclidean distance between the touches
    pub distance: f64,
    /// Angle of the line from `a` to `b` in degrees (`atan2`, -180 to 180)
    pub angle: f64,
    /// Midpoint of the two touches
    pub center: Point,
}

/// Measure a pair of touches. This is the primitive for both pinch-zoom and
/// twist-rotate.
pub fn calculate_pinch_gesture(a: Point, b: Point) -> PinchMetrics {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    PinchMetrics {
        distance: dx.hypot(dy),
        angle: dy.atan2(dx).to_degrees(),
        center: Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
    }
}

/// Multiply `current` by `delta_scale` and clamp into `[min, max]`.
///
/// The result is always inside the range, including for a zero, infinite or
/// NaN scale factor.
pub fn calculate_new_zoom(current: f64, delta_scale: f64, min: f64, max: f64) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let next = current * delta_scale;

    if next.is_nan() {
        return if current.is_nan() { lo } else { current.clamp(lo, hi) };
    }
    next.clamp(lo, hi)
}

/// Add `delta_angle` to `current`, normalize into `[0, 360)` and round to a
/// whole degree.
pub fn calculate_new_rotation(current: f64, delta_angle: f64) -> f64 {
    let next = current + delta_angle;
    if !next.is_finite() {
        return 0.0;
    }

    let rounded = next.rem_euclid(360.0).round();
    if rounded >= 360.0 {
        0.0
    } else {
        rounded
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
