//! Authoritative crop state and its pure derivations.
//!
//! [`CropStore`] owns the container size, the natural image size, the pan
//! offset and the optional user-resized crop box. Everything else (base-fit
//! size, crop box size, displayed size, readiness) is recomputed from those
//! fields plus the externally owned zoom and aspect ratio on every read, so
//! no derived value can go stale when inputs change out of order.
//!
//! The derivation helpers take candidate inputs instead of reading mutable
//! state, which lets the gesture layer ask "what would the rect be if the
//! gesture ended now" without committing anything.

use serde::Serialize;

use crate::geometry::{
    calculate_base_fit_size, calculate_crop_box_size, calculate_normalized_crop_rect,
    clamp_crop_size, clamp_offset, crop_size_from_normalized_rect, offset_from_normalized_rect, usable_ratio,
    NormalizedCropRect, Offset, Size,
};

/// Relative tolerance used to decide whether a persisted rect was produced
/// under the active fixed aspect ratio.
const ASPECT_MATCH_TOLERANCE: f64 = 1e-3;

/// Slack allowed before a crop box counts as larger than the image.
const FIT_TOLERANCE: f64 = 1e-9;

/// Snapshot of every derived quantity for one set of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropGeometry {
    /// Image size at zoom 1
    pub base_fit: Size,
    /// On-screen crop box size
    pub crop_box: Size,
    /// Image size at the current zoom
    pub image_display: Size,
    /// Whether gestures and rendering may proceed
    pub ready: bool,
}

/// Owner of the continuous crop state.
#[derive(Debug, Clone)]
pub struct CropStore {
    edge_padding: f64,
    container_size: Size,
    image_natural_size: Size,
    image_offset: Offset,
    custom_crop_size: Option<Size>,
    previous_aspect_ratio: Option<f64>,
    initialized: bool,
}

impl CropStore {
    /// Create an empty store. `edge_padding` is removed from every container
    /// side before the image is fitted.
    pub fn new(edge_padding: f64) -> Self {
        Self {
            edge_padding,
            container_size: Size::ZERO,
            image_natural_size: Size::ZERO,
            image_offset: Offset::ZERO,
            custom_crop_size: None,
            previous_aspect_ratio: None,
            initialized: false,
        }
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    pub fn image_natural_size(&self) -> Size {
        self.image_natural_size
    }

    pub fn image_offset(&self) -> Offset {
        self.image_offset
    }

    pub fn custom_crop_size(&self) -> Option<Size> {
        self.custom_crop_size
    }

    /// Whether the initial crop rect has been established for this image.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set by the hosting view once per layout pass.
    pub fn set_container_size(&mut self, size: Size) {
        self.container_size = size;
    }

    /// Set once per image load.
    pub fn set_image_natural_size(&mut self, size: Size) {
        self.image_natural_size = size;
    }

    pub fn set_image_offset(&mut self, offset: Offset) {
        self.image_offset = offset;
    }

    pub fn set_custom_crop_size(&mut self, size: Option<Size>) {
        self.custom_crop_size = size;
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Forget everything tied to the previous image source.
    pub fn reset_for_new_image(&mut self) {
        log::debug!("crop store reset for new image source");
        self.image_natural_size = Size::ZERO;
        self.image_offset = Offset::ZERO;
        self.custom_crop_size = None;
        self.previous_aspect_ratio = None;
        self.initialized = false;
    }

    /// Shrink the crop box when it no longer fits the image at `zoom`.
    ///
    /// A box resized at a high zoom can be larger than the image once the
    /// zoom drops. It is clamped to [`max_crop_size`](Self::max_crop_size),
    /// keeping a fixed ratio. Callers re-clamp the offset afterwards.
    pub fn fit_crop_to_zoom(&mut self, zoom: f64, aspect_ratio: Option<f64>, min_size: f64) {
        if !self.is_ready(zoom) {
            return;
        }
        let current = self.crop_box_size(aspect_ratio);
        let max = self.max_crop_size(zoom);
        if current.width <= max.width + FIT_TOLERANCE && current.height <= max.height + FIT_TOLERANCE {
            return;
        }

        let fitted = clamp_crop_size(current, usable_ratio(aspect_ratio), min_size, max);
        log::debug!("crop box {:?} shrunk to {:?} for zoom {}", current, fitted, zoom);
        self.custom_crop_size = Some(fitted);
    }

    /// Image size at zoom 1.
    pub fn base_fit_size(&self) -> Size {
        calculate_base_fit_size(
            self.container_size,
            self.image_natural_size,
            self.edge_padding,
        )
    }

    /// On-screen crop box size: the user-resized box when present, otherwise
    /// derived from the aspect ratio.
    pub fn crop_box_size(&self, aspect_ratio: Option<f64>) -> Size {
        match self.custom_crop_size {
            Some(size) => size,
            None => calculate_crop_box_size(
                self.base_fit_size(),
                aspect_ratio,
                self.previous_aspect_ratio,
            ),
        }
    }

    /// Largest crop box a resize may produce at `zoom`: the displayed image,
    /// limited to the padded container so the box stays on screen.
    pub fn max_crop_size(&self, zoom: f64) -> Size {
        let display = self.image_display_size(zoom);
        let padding = self.edge_padding.max(0.0) * 2.0;
        Size::new(
            display.width.min(self.container_size.width - padding).max(0.0),
            display.height.min(self.container_size.height - padding).max(0.0),
        )
    }

    /// Image size at `zoom`.
    pub fn image_display_size(&self, zoom: f64) -> Size {
        self.base_fit_size().scale(zoom)
    }

    /// Ready only when the container, displayed and natural sizes are all
    /// strictly positive. Nothing else in the engine checks preconditions.
    pub fn is_ready(&self, zoom: f64) -> bool {
        self.container_size.is_positive()
            && self.image_natural_size.is_positive()
            && self.image_display_size(zoom).is_positive()
    }

    /// Every derived quantity for the given external inputs.
    pub fn geometry(&self, zoom: f64, aspect_ratio: Option<f64>) -> CropGeometry {
        CropGeometry {
            base_fit: self.base_fit_size(),
            crop_box: self.crop_box_size(aspect_ratio),
            image_display: self.image_display_size(zoom),
            ready: self.is_ready(zoom),
        }
    }

    /// Clamp a candidate offset for a candidate zoom and crop size.
    pub fn clamp_image_offset(&self, offset: Offset, zoom: f64, crop_size: Size) -> Offset {
        clamp_offset(offset, self.image_display_size(zoom), crop_size)
    }

    /// The normalized rect a candidate offset, zoom and crop size would
    /// produce. Falls back to the full image while geometry is degenerate.
    pub fn calculate_crop_rect(
        &self,
        offset: Offset,
        zoom: f64,
        crop_size: Size,
    ) -> NormalizedCropRect {
        calculate_normalized_crop_rect(
            offset,
            self.image_display_size(zoom),
            crop_size,
            NormalizedCropRect::FULL,
        )
    }

    /// The normalized rect for the committed state.
    pub fn current_crop_rect(&self, zoom: f64, aspect_ratio: Option<f64>) -> NormalizedCropRect {
        self.calculate_crop_rect(self.image_offset, zoom, self.crop_box_size(aspect_ratio))
    }

    /// Rebuild offset (and, when applicable, the custom crop size) from a
    /// persisted rect. This is the exact inverse of
    /// [`calculate_crop_rect`](Self::calculate_crop_rect).
    ///
    /// Free-form always restores the box size from the rect. Under a fixed
    /// ratio the box size is restored only when the rect's pixel proportions
    /// match that ratio; otherwise the ratio-derived box is kept.
    pub fn restore_from_rect(
        &mut self,
        rect: &NormalizedCropRect,
        zoom: f64,
        aspect_ratio: Option<f64>,
    ) {
        let display = self.image_display_size(zoom);
        let restored_size = crop_size_from_normalized_rect(rect, display);

        self.custom_crop_size = match usable_ratio(aspect_ratio) {
            None => Some(restored_size),
            Some(ratio) => restored_size
                .aspect_ratio()
                .filter(|r| ((r - ratio) / ratio).abs() < ASPECT_MATCH_TOLERANCE)
                .map(|_| restored_size),
        };
        if let Some(ratio) = usable_ratio(aspect_ratio) {
            self.previous_aspect_ratio = Some(ratio);
        }

        let crop = self.crop_box_size(aspect_ratio);
        let offset = offset_from_normalized_rect(rect, display);
        self.image_offset = clamp_offset(offset, display, crop);
        log::debug!(
            "restored crop rect {:?} as offset {:?}, box {:?}",
            rect,
            self.image_offset,
            crop
        );
    }

    /// React to an aspect ratio change.
    ///
    /// A fixed ratio discards the user-resized box and becomes the ratio that
    /// a later switch to free-form preserves. The offset is re-clamped for
    /// the new box. Aspect changes commit, so the resulting rect is returned
    /// for emission; `None` while the store is not ready.
    pub fn apply_aspect_ratio(
        &mut self,
        aspect_ratio: Option<f64>,
        zoom: f64,
    ) -> Option<NormalizedCropRect> {
        if let Some(ratio) = usable_ratio(aspect_ratio) {
            self.custom_crop_size = None;
            self.previous_aspect_ratio = Some(ratio);
        }

        if !self.is_ready(zoom) {
            return None;
        }

        let crop = self.crop_box_size(aspect_ratio);
        let offset = self.clamp_image_offset(self.image_offset, zoom, crop);
        if offset != self.image_offset {
            log::debug!("aspect change re-clamped offset to {:?}", offset);
        }
        self.image_offset = offset;

        Some(self.calculate_crop_rect(offset, zoom, crop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_store() -> CropStore {
        let mut store = CropStore::new(20.0);
        store.set_container_size(Size::new(400.0, 800.0));
        store.set_image_natural_size(Size::new(1200.0, 1600.0));
        store
    }

    fn assert_rect_close(a: NormalizedCropRect, b: NormalizedCropRect) {
        assert!(
            (a.x - b.x).abs() < 1e-9
                && (a.y - b.y).abs() < 1e-9
                && (a.width - b.width).abs() < 1e-9
                && (a.height - b.height).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_not_ready_without_image() {
        let mut store = CropStore::new(20.0);
        store.set_container_size(Size::new(400.0, 800.0));
        assert!(!store.is_ready(1.0));
        assert_eq!(store.base_fit_size(), Size::ZERO);
    }

    #[test]
    fn test_not_ready_without_container() {
        let mut store = CropStore::new(20.0);
        store.set_image_natural_size(Size::new(100.0, 100.0));
        assert!(!store.is_ready(1.0));
    }

    #[test]
    fn test_geometry_derivations() {
        let store = ready_store();
        let geometry = store.geometry(2.0, None);

        assert_eq!(geometry.base_fit, Size::new(360.0, 480.0));
        assert_eq!(geometry.crop_box, Size::new(360.0, 480.0));
        assert_eq!(geometry.image_display, Size::new(720.0, 960.0));
        assert!(geometry.ready);
    }

    #[test]
    fn test_custom_size_overrides_ratio() {
        let mut store = ready_store();
        store.set_custom_crop_size(Some(Size::new(100.0, 200.0)));
        assert_eq!(store.crop_box_size(Some(1.0)), Size::new(100.0, 200.0));
    }

    #[test]
    fn test_reset_for_new_image() {
        let mut store = ready_store();
        store.set_image_offset(Offset::new(10.0, 10.0));
        store.set_custom_crop_size(Some(Size::new(100.0, 100.0)));
        store.apply_aspect_ratio(Some(1.0), 1.0);
        store.mark_initialized();

        store.reset_for_new_image();

        assert_eq!(store.image_offset(), Offset::ZERO);
        assert_eq!(store.previous_aspect_ratio, None);
        assert_eq!(store.custom_crop_size(), None);
        assert!(!store.is_initialized());
        assert!(!store.is_ready(1.0));
        // Container survives an image change
        assert_eq!(store.container_size(), Size::new(400.0, 800.0));
    }

    #[test]
    fn test_clamp_image_offset_uses_candidate_zoom() {
        let store = ready_store();
        let crop = Size::new(360.0, 480.0);

        // At zoom 1 the box fills the image: no movement allowed
        assert_eq!(
            store.clamp_image_offset(Offset::new(50.0, 50.0), 1.0, crop),
            Offset::ZERO
        );
        // At zoom 2 there is 180/240 px of slack per side
        assert_eq!(
            store.clamp_image_offset(Offset::new(500.0, -500.0), 2.0, crop),
            Offset::new(180.0, -240.0)
        );
    }

    #[test]
    fn test_default_rect_is_full() {
        let store = ready_store();
        assert!(store.current_crop_rect(1.0, None).is_full(1e-9));
    }

    #[test]
    fn test_crop_rect_falls_back_when_not_ready() {
        let store = CropStore::new(20.0);
        assert_eq!(
            store.calculate_crop_rect(Offset::ZERO, 1.0, Size::new(10.0, 10.0)),
            NormalizedCropRect::FULL
        );
    }

    #[test]
    fn test_apply_fixed_ratio_emits_centered_square() {
        let mut store = ready_store();
        let rect = store.apply_aspect_ratio(Some(1.0), 1.0).unwrap();

        assert_rect_close(
            rect,
            NormalizedCropRect {
                x: 0.0,
                y: 0.125,
                width: 1.0,
                height: 0.75,
            },
        );
    }

    #[test]
    fn test_apply_fixed_ratio_clears_custom_size() {
        let mut store = ready_store();
        store.set_custom_crop_size(Some(Size::new(100.0, 300.0)));
        store.apply_aspect_ratio(Some(1.0), 1.0);
        assert_eq!(store.custom_crop_size(), None);
    }

    #[test]
    fn test_free_form_after_fixed_keeps_box() {
        let mut store = ready_store();
        store.apply_aspect_ratio(Some(1.0), 1.0);
        store.apply_aspect_ratio(None, 1.0);
        assert_eq!(store.crop_box_size(None), Size::new(360.0, 360.0));
    }

    #[test]
    fn test_free_form_keeps_custom_size() {
        let mut store = ready_store();
        store.set_custom_crop_size(Some(Size::new(100.0, 300.0)));
        store.apply_aspect_ratio(None, 1.0);
        assert_eq!(store.custom_crop_size(), Some(Size::new(100.0, 300.0)));
    }

    #[test]
    fn test_apply_ratio_reclamps_offset() {
        let mut store = ready_store();
        // Small square box at zoom 2, pushed to the corner
        store.set_custom_crop_size(Some(Size::new(100.0, 100.0)));
        store.set_image_offset(Offset::new(300.0, 400.0));

        // Wide box has less slack horizontally
        store.apply_aspect_ratio(Some(360.0 / 202.5), 2.0).unwrap();
        let offset = store.image_offset();
        assert!((offset.x - 180.0).abs() < 1e-9, "got {:?}", offset);
        assert!(offset.y <= 480.0);
    }

    #[test]
    fn test_apply_ratio_not_ready_returns_none() {
        let mut store = CropStore::new(20.0);
        assert_eq!(store.apply_aspect_ratio(Some(1.0), 1.0), None);
    }

    #[test]
    fn test_restore_free_form_round_trip() {
        let mut store = ready_store();
        let rect = NormalizedCropRect {
            x: 0.2,
            y: 0.1,
            width: 0.5,
            height: 0.3,
        };
        store.restore_from_rect(&rect, 2.0, None);

        let size = store.custom_crop_size().unwrap();
        assert!((size.width - 360.0).abs() < 1e-9);
        assert!((size.height - 288.0).abs() < 1e-9);
        assert_rect_close(store.current_crop_rect(2.0, None), rect);
    }

    #[test]
    fn test_restore_fixed_ratio_uses_ratio_box() {
        let mut store = ready_store();
        // Centered square produced by the default 1:1 box at zoom 1
        let rect = NormalizedCropRect {
            x: 0.0,
            y: 0.125,
            width: 1.0,
            height: 0.75,
        };
        store.restore_from_rect(&rect, 1.0, Some(1.0));
        assert_rect_close(store.current_crop_rect(1.0, Some(1.0)), rect);
    }

    #[test]
    fn test_restore_fixed_ratio_keeps_resized_box() {
        let mut store = ready_store();
        // 180x180 px square at zoom 1: width 0.5 of 360, height 0.375 of 480
        let rect = NormalizedCropRect {
            x: 0.25,
            y: 0.5,
            width: 0.5,
            height: 0.375,
        };
        store.restore_from_rect(&rect, 1.0, Some(1.0));

        assert_eq!(store.custom_crop_size(), Some(Size::new(180.0, 180.0)));
        assert_rect_close(store.current_crop_rect(1.0, Some(1.0)), rect);
    }

    #[test]
    fn test_restore_fixed_ratio_mismatched_rect_drops_size() {
        let mut store = ready_store();
        let rect = NormalizedCropRect {
            x: 0.0,
            y: 0.0,
            width: 0.5,
            height: 0.5,
        };
        store.restore_from_rect(&rect, 1.0, Some(1.0));
        assert_eq!(store.custom_crop_size(), None);
    }

    #[test]
    fn test_reset_drops_previous_ratio_box() {
        let mut store = ready_store();
        store.apply_aspect_ratio(Some(1.0), 1.0);
        store.apply_aspect_ratio(None, 1.0);
        assert_eq!(store.crop_box_size(None), Size::new(360.0, 360.0));

        store.reset_for_new_image();
        store.set_image_natural_size(Size::new(1200.0, 1600.0));

        assert_eq!(store.crop_box_size(None), Size::new(360.0, 480.0));
    }

    #[test]
    fn test_fit_crop_to_zoom_shrinks_oversized_box() {
        let mut store = ready_store();
        // Grown at zoom 2 (display 720x960), box limited to the padded container
        store.set_custom_crop_size(Some(Size::new(304.0, 760.0)));

        store.fit_crop_to_zoom(1.0, Some(0.4), 50.0);

        let size = store.custom_crop_size().unwrap();
        assert!((size.width - 192.0).abs() < 1e-9, "got {:?}", size);
        assert!((size.height - 480.0).abs() < 1e-9, "got {:?}", size);
    }

    #[test]
    fn test_fit_crop_to_zoom_keeps_fitting_box() {
        let mut store = ready_store();
        store.apply_aspect_ratio(Some(4.0 / 3.0), 1.0);

        store.fit_crop_to_zoom(1.0, Some(4.0 / 3.0), 50.0);
        assert_eq!(store.custom_crop_size(), None);

        store.set_custom_crop_size(Some(Size::new(200.0, 300.0)));
        store.fit_crop_to_zoom(2.0, None, 50.0);
        assert_eq!(store.custom_crop_size(), Some(Size::new(200.0, 300.0)));
    }
}
