//! Pan and pinch recognition for the image layer.
//!
//! # State Machine
//!
//! ```text
//! Idle --1 touch--> Panning --2 touches--> Pinching --finger lifted--> Panning (rebased)
//!   ^                  |                       |
//!   +------ release / terminate ---------------+
//! ```
//!
//! Pinch deltas are frame-to-frame: each move is compared with the previous
//! move's distance, angle and centre, never with the gesture start. This keeps
//! zoom and rotation continuous but makes the result depend on event order.

use crate::config::CropConfig;
use crate::geometry::{
    calculate_new_rotation, calculate_new_zoom, calculate_pinch_gesture, Offset, PinchMetrics,
    Point,
};
use crate::store::CropStore;

use super::{CropEvent, GestureInputs};

/// Pinch distances at or below this are treated as coincident touches.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

/// Baseline and last-frame values of a two-finger gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchTracker {
    pub start_distance: f64,
    pub start_angle: f64,
    pub start_center: Point,
    pub last_distance: f64,
    pub last_angle: f64,
    pub last_center: Point,
    /// Twist not yet applied because rotation is kept to whole degrees
    pub angle_remainder: f64,
}

impl PinchTracker {
    fn new(metrics: PinchMetrics) -> Self {
        Self {
            start_distance: metrics.distance,
            start_angle: metrics.angle,
            start_center: metrics.center,
            last_distance: metrics.distance,
            last_angle: metrics.angle,
            last_center: metrics.center,
            angle_remainder: 0.0,
        }
    }
}

/// State of the image surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImageGestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// One finger: offset follows the finger relative to its start.
    Panning { start_offset: Offset, start_page: Point },
    /// Two fingers: zoom, rotation and offset follow frame-to-frame deltas.
    Pinching(PinchTracker),
}

/// Values captured when the gesture was granted.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GrantSnapshot {
    offset: Offset,
    zoom: f64,
    rotation: f64,
}

/// Combined pan / pinch / twist responder for the image layer.
#[derive(Debug, Clone, Default)]
pub struct ImageGesture {
    state: ImageGestureState,
    granted: Option<GrantSnapshot>,
}

impl ImageGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ImageGestureState {
        &self.state
    }

    /// Whether a gesture has been granted and not yet ended.
    pub fn is_active(&self) -> bool {
        self.granted.is_some()
    }

    /// Start a gesture with the touches currently down.
    pub fn grant(&mut self, touches: &[Point], store: &CropStore, inputs: &GestureInputs) {
        let offset = store.image_offset();
        self.granted = Some(GrantSnapshot {
            offset,
            zoom: inputs.zoom,
            rotation: inputs.rotation,
        });

        self.state = match touches {
            [a, b, ..] => ImageGestureState::Pinching(PinchTracker::new(
                calculate_pinch_gesture(*a, *b),
            )),
            [page] => ImageGestureState::Panning {
                start_offset: offset,
                start_page: *page,
            },
            [] => ImageGestureState::Idle,
        };
        log::debug!("image gesture granted with {} touch(es)", touches.len());
    }

    /// Process a move with the touches currently down.
    ///
    /// Returns live zoom/rotation events for pinch frames; pans and baseline
    /// frames only update the store.
    pub fn update(
        &mut self,
        touches: &[Point],
        store: &mut CropStore,
        inputs: &GestureInputs,
        config: &CropConfig,
    ) -> Vec<CropEvent> {
        match touches {
            [a, b, ..] => self.update_pinch(calculate_pinch_gesture(*a, *b), store, inputs, config),
            [page] => {
                self.update_pan(*page, store, inputs);
                Vec::new()
            }
            [] => Vec::new(),
        }
    }

    fn update_pinch(
        &mut self,
        metrics: PinchMetrics,
        store: &mut CropStore,
        inputs: &GestureInputs,
        config: &CropConfig,
    ) -> Vec<CropEvent> {
        let has_baseline = matches!(
            &self.state,
            ImageGestureState::Pinching(tracker) if tracker.last_distance > MIN_PINCH_DISTANCE
        );
        if !has_baseline {
            // New baseline: entering from pan/idle, or touches reported as
            // coincident. Computing a delta here would spike the zoom.
            self.state = ImageGestureState::Pinching(PinchTracker::new(metrics));
            return Vec::new();
        }
        let ImageGestureState::Pinching(tracker) = &mut self.state else {
            return Vec::new();
        };

        let delta_scale = metrics.distance / tracker.last_distance;
        let delta_angle = wrap_degrees(metrics.angle - tracker.last_angle) + tracker.angle_remainder;
        let delta_x = metrics.center.x - tracker.last_center.x;
        let delta_y = metrics.center.y - tracker.last_center.y;

        let zoom = calculate_new_zoom(inputs.zoom, delta_scale, config.min_zoom, config.max_zoom);
        let rotation = calculate_new_rotation(inputs.rotation, delta_angle);
        tracker.angle_remainder = delta_angle - wrap_degrees(rotation - inputs.rotation);

        tracker.last_distance = metrics.distance;
        tracker.last_angle = metrics.angle;
        tracker.last_center = metrics.center;

        store.fit_crop_to_zoom(zoom, inputs.aspect_ratio, config.min_crop_size);
        let crop = store.crop_box_size(inputs.aspect_ratio);
        let offset = store.image_offset().translate(delta_x, delta_y);
        store.set_image_offset(store.clamp_image_offset(offset, zoom, crop));

        vec![CropEvent::ZoomChanged(zoom), CropEvent::RotationChanged(rotation)]
    }

    fn update_pan(&mut self, page: Point, store: &mut CropStore, inputs: &GestureInputs) {
        match self.state {
            ImageGestureState::Panning {
                start_offset,
                start_page,
            } => {
                let crop = store.crop_box_size(inputs.aspect_ratio);
                let offset = start_offset.translate(page.x - start_page.x, page.y - start_page.y);
                store.set_image_offset(store.clamp_image_offset(offset, inputs.zoom, crop));
            }
            ImageGestureState::Pinching(_) | ImageGestureState::Idle => {
                // A lifted finger restarts the pan from where the image is now
                self.state = ImageGestureState::Panning {
                    start_offset: store.image_offset(),
                    start_page: page,
                };
            }
        }
    }

    /// End the gesture and commit the crop rect for the current state.
    pub fn release(&mut self, store: &CropStore, inputs: &GestureInputs) -> Vec<CropEvent> {
        let granted = self.granted.take();
        self.state = ImageGestureState::Idle;

        let Some(granted) = granted else {
            return Vec::new();
        };
        log::debug!(
            "image gesture released: offset {:?} -> {:?}, zoom {} -> {}, rotation {} -> {}",
            granted.offset,
            store.image_offset(),
            granted.zoom,
            inputs.zoom,
            granted.rotation,
            inputs.rotation
        );

        let crop = store.crop_box_size(inputs.aspect_ratio);
        vec![CropEvent::CropChanged(store.calculate_crop_rect(
            store.image_offset(),
            inputs.zoom,
            crop,
        ))]
    }

    /// Drop the gesture without committing. The store keeps the last move.
    pub fn terminate(&mut self) {
        if self.granted.take().is_some() {
            log::debug!("image gesture terminated");
        }
        self.state = ImageGestureState::Idle;
    }
}

/// Wrap an angle difference into `(-180, 180]` so crossing the `atan2`
/// discontinuity reads as a small twist.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}
