//! Crop view bindings.
//!
//! `JsCropper` wraps the core [`Cropper`] and turns its events into calls of
//! the registered JavaScript callbacks:
//!
//! - `onCropChange(rect)` once per committed gesture, aspect change or
//!   initial default
//! - `onZoomChange(zoom)` and `onRotationChange(degrees)` on every pinch frame
//!
//! # Example
//!
//! ```typescript
//! const cropper = new JsCropper(undefined, { zoom: 1, rotation: 0 });
//! cropper.set_on_crop_change((rect) => settings.setCrop(rect));
//! cropper.set_image(uri, settings.crop);
//! cropper.set_container_size(layout.width, layout.height);
//! cropper.image_loaded(image.width, image.height);
//!
//! view.onTouchMove = (e) => cropper.pointer_move(flatTouches(e.touches));
//! ```

use exframe_core::{CropConfig, CropEvent, CropProps, Cropper, Flip, NormalizedCropRect, Point, Size};
use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::types::{from_js, js_error, to_js};

/// Touches arrive as a flat `[x0, y0, x1, y1, ...]` array in container
/// coordinates. A trailing odd value is ignored.
fn touches_from_flat(flat: &[f64]) -> Vec<Point> {
    flat.chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

#[wasm_bindgen]
pub struct JsCropper {
    inner: Cropper,
    on_crop_change: Option<Function>,
    on_zoom_change: Option<Function>,
    on_rotation_change: Option<Function>,
}

#[wasm_bindgen]
impl JsCropper {
    /// Create a cropper. Both arguments accept partial objects or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, props: JsValue) -> Result<JsCropper, JsValue> {
        let config: CropConfig = from_js(config, "crop config")?.unwrap_or_default();
        let props: CropProps = from_js(props, "crop props")?.unwrap_or_default();
        let inner = Cropper::with_config(config, props).map_err(js_error)?;
        Ok(Self::from_cropper(inner))
    }

    pub fn set_on_crop_change(&mut self, callback: Option<Function>) {
        self.on_crop_change = callback;
    }

    pub fn set_on_zoom_change(&mut self, callback: Option<Function>) {
        self.on_zoom_change = callback;
    }

    pub fn set_on_rotation_change(&mut self, callback: Option<Function>) {
        self.on_rotation_change = callback;
    }

    /// Point the view at an image, with an optional persisted crop rect.
    pub fn set_image(&mut self, uri: &str, initial_rect: JsValue) -> Result<(), JsValue> {
        let initial_rect: Option<NormalizedCropRect> = from_js(initial_rect, "crop rect")?;
        self.inner.set_image(uri, initial_rect);
        Ok(())
    }

    pub fn image_loaded(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        let events = self.inner.image_loaded(Size::new(width, height));
        self.dispatch(events)
    }

    pub fn image_load_failed(&mut self, reason: &str) {
        self.inner.image_load_failed(reason);
    }

    pub fn set_container_size(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        let events = self.inner.set_container_size(Size::new(width, height));
        self.dispatch(events)
    }

    /// `undefined` switches to free-form.
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> Result<(), JsValue> {
        let events = self.inner.set_aspect_ratio(ratio);
        self.dispatch(events)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), JsValue> {
        let events = self.inner.set_zoom(zoom);
        self.dispatch(events)
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.inner.set_rotation(degrees);
    }

    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        self.inner.set_flip(Flip {
            horizontal,
            vertical,
        });
    }

    pub fn pointer_down(&mut self, touches: &[f64]) -> Result<(), JsValue> {
        let events = self.inner.pointer_down(&touches_from_flat(touches));
        self.dispatch(events)
    }

    pub fn pointer_move(&mut self, touches: &[f64]) -> Result<(), JsValue> {
        let events = self.inner.pointer_move(&touches_from_flat(touches));
        self.dispatch(events)
    }

    /// `remaining` lists the touches still down after the lift.
    pub fn pointer_up(&mut self, remaining: &[f64]) -> Result<(), JsValue> {
        let events = self.inner.pointer_up(&touches_from_flat(remaining));
        self.dispatch(events)
    }

    pub fn pointer_cancel(&mut self) {
        self.inner.pointer_cancel();
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_rect())
    }

    pub fn props(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.props())
    }

    pub fn geometry(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.geometry())
    }

    /// Overlay layout, `null` while not ready.
    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        match self.inner.overlay() {
            Some(layout) => to_js(&layout),
            None => Ok(JsValue::NULL),
        }
    }

    /// Image layer placement, `null` while not ready.
    pub fn image_layer(&self) -> Result<JsValue, JsValue> {
        match self.inner.image_layer() {
            Some(layer) => to_js(&layer),
            None => Ok(JsValue::NULL),
        }
    }

    /// Crop rect, rotation and flip for `render_export`.
    pub fn export_transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.export_transform())
    }
}

impl JsCropper {
    pub(crate) fn from_cropper(inner: Cropper) -> Self {
        Self {
            inner,
            on_crop_change: None,
            on_zoom_change: None,
            on_rotation_change: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn cropper(&self) -> &Cropper {
        &self.inner
    }

    /// Forward events to whichever callbacks are registered. Nothing is
    /// converted for an event without a listener.
    fn dispatch(&self, events: Vec<CropEvent>) -> Result<(), JsValue> {
        for event in events {
            match event {
                CropEvent::CropChanged(rect) => {
                    if let Some(callback) = &self.on_crop_change {
                        callback.call1(&JsValue::NULL, &to_js(&rect)?)?;
                    }
                }
                CropEvent::ZoomChanged(zoom) => {
                    if let Some(callback) = &self.on_zoom_change {
                        callback.call1(&JsValue::NULL, &JsValue::from_f64(zoom))?;
                    }
                }
                CropEvent::RotationChanged(degrees) => {
                    if let Some(callback) = &self.on_rotation_change {
                        callback.call1(&JsValue::NULL, &JsValue::from_f64(degrees))?;
                    }
                }
            }
        }
        Ok(())
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_new_with_undefined_uses_defaults() {
        let cropper = JsCropper::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
        assert_eq!(cropper.cropper().config(), &CropConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_new_rejects_invalid_config() {
        let config = serde_wasm_bindgen::to_value(&CropConfig {
            min_zoom: 3.0,
            max_zoom: 2.0,
            ..CropConfig::default()
        })
        .unwrap();
        assert!(JsCropper::new(config, JsValue::UNDEFINED).is_err());
    }

    #[wasm_bindgen_test]
    fn test_overlay_null_until_ready() {
        let cropper = JsCropper::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
        assert!(cropper.overlay().unwrap().is_null());
    }

    #[wasm_bindgen_test]
    fn test_crop_change_callback_receives_rect() {
        let mut cropper = JsCropper::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
        let received = js_sys::Array::new();
        let sink = received.clone();
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |rect: JsValue| {
            sink.push(&rect);
        });
        cropper.set_on_crop_change(Some(callback.as_ref().unchecked_ref::<Function>().clone()));

        cropper.set_image("asset://a.jpg", JsValue::UNDEFINED).unwrap();
        cropper.set_container_size(400.0, 800.0).unwrap();
        cropper.image_loaded(1200.0, 1600.0).unwrap();

        assert_eq!(received.length(), 1);
        let rect: NormalizedCropRect = serde_wasm_bindgen::from_value(received.get(0)).unwrap();
        assert!(rect.is_full(1e-9));
    }
}
