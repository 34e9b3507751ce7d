//! The crop view component.
//!
//! [`Cropper`] wires the [`CropStore`], the image gesture surface and the four
//! corner responders to the externally owned props. Each call returns the
//! [`CropEvent`]s the host should forward to its settings collaborator.
//!
//! Pointer positions are in container coordinates (origin at the container's
//! top-left). Only deltas matter for panning and pinching, but corner hit
//! testing compares positions against the overlay layout.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, CropConfig};
use crate::geometry::{calculate_new_rotation, usable_ratio, Flip, NormalizedCropRect, Point, Size};
use crate::gesture::{Corner, CornerResponder, CropEvent, GestureInputs, ImageGesture};
use crate::overlay::{ImageLayerTransform, OverlayLayout};
use crate::store::{CropGeometry, CropStore};
use crate::transform::ExportTransform;

/// Values owned by the settings collaborator and passed into the crop view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropProps {
    pub zoom: f64,
    /// Whole degrees, `[0, 360)`
    pub rotation: f64,
    pub flip: Flip,
    /// Fixed width/height ratio, `None` for free-form
    pub aspect_ratio: Option<f64>,
}

impl Default for CropProps {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation: 0.0,
            flip: Flip::NONE,
            aspect_ratio: None,
        }
    }
}

/// Which surface currently owns the pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveSurface {
    None,
    Image,
    Corner(usize),
}

/// Interactive crop view state for one image.
#[derive(Debug, Clone)]
pub struct Cropper {
    config: CropConfig,
    store: CropStore,
    props: CropProps,
    image_gesture: ImageGesture,
    corners: [CornerResponder; 4],
    active: ActiveSurface,
    image_uri: Option<String>,
    initial_rect: Option<NormalizedCropRect>,
}

impl Cropper {
    /// Create a cropper with the default configuration.
    pub fn new(props: CropProps) -> Self {
        Self::build(CropConfig::default(), props)
    }

    /// Create a cropper with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is unusable.
    pub fn with_config(config: CropConfig, props: CropProps) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, props))
    }

    fn build(config: CropConfig, props: CropProps) -> Self {
        let props = CropProps {
            zoom: config.clamp_zoom(props.zoom),
            aspect_ratio: usable_ratio(props.aspect_ratio),
            ..props
        };
        Self {
            store: CropStore::new(config.edge_padding),
            config,
            props,
            image_gesture: ImageGesture::new(),
            corners: Corner::ALL.map(CornerResponder::new),
            active: ActiveSurface::None,
            image_uri: None,
            initial_rect: None,
        }
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn props(&self) -> &CropProps {
        &self.props
    }

    pub fn store(&self) -> &CropStore {
        &self.store
    }

    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref()
    }

    fn inputs(&self) -> GestureInputs {
        GestureInputs {
            zoom: self.props.zoom,
            rotation: self.props.rotation,
            aspect_ratio: self.props.aspect_ratio,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready(self.props.zoom)
    }

    /// Whether the initial crop rect for the current image has been set up.
    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    pub fn geometry(&self) -> CropGeometry {
        self.store.geometry(self.props.zoom, self.props.aspect_ratio)
    }

    /// The rect the current committed state corresponds to.
    pub fn crop_rect(&self) -> NormalizedCropRect {
        self.store
            .current_crop_rect(self.props.zoom, self.props.aspect_ratio)
    }

    /// Crop rect, rotation and flip for rendering the export.
    pub fn export_transform(&self) -> ExportTransform {
        ExportTransform {
            crop: self.crop_rect(),
            rotation: self.props.rotation,
            flip: self.props.flip,
        }
    }

    /// Overlay layout, or `None` while not ready.
    pub fn overlay(&self) -> Option<OverlayLayout> {
        if !self.is_ready() {
            return None;
        }
        OverlayLayout::compute(
            self.store.container_size(),
            self.store.crop_box_size(self.props.aspect_ratio),
            &self.config,
        )
    }

    /// Image layer placement, or `None` while not ready.
    pub fn image_layer(&self) -> Option<ImageLayerTransform> {
        if !self.is_ready() {
            return None;
        }
        ImageLayerTransform::compute(
            self.store.container_size(),
            self.store.image_display_size(self.props.zoom),
            self.store.image_offset(),
            self.props.rotation,
            self.props.flip,
        )
    }

    /// Point the view at an image. A different `uri` resets all crop state;
    /// the same `uri` only refreshes the pending initial rect.
    ///
    /// An `initial_rect` that breaks the normalized contract is logged and
    /// ignored, so a default rect is emitted once geometry is ready.
    pub fn set_image(&mut self, uri: &str, initial_rect: Option<NormalizedCropRect>) {
        let initial_rect = initial_rect.filter(|rect| match rect.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("ignoring persisted crop rect for {}: {}", uri, e);
                false
            }
        });

        if self.image_uri.as_deref() == Some(uri) {
            if !self.store.is_initialized() {
                self.initial_rect = initial_rect;
            }
            return;
        }

        log::debug!("crop view switching to image {}", uri);
        self.cancel_gestures();
        self.store.reset_for_new_image();
        self.image_uri = Some(uri.to_string());
        self.initial_rect = initial_rect;
    }

    /// The host finished loading the image and reports its natural size.
    pub fn image_loaded(&mut self, natural_size: Size) -> Vec<CropEvent> {
        self.store.set_image_natural_size(natural_size);
        self.try_initialize()
    }

    /// The host failed to load the image. The view stays not-ready until a
    /// new image is set.
    pub fn image_load_failed(&mut self, reason: &str) {
        log::warn!(
            "image {} failed to load: {}",
            self.image_uri.as_deref().unwrap_or("<none>"),
            reason
        );
        self.store.set_image_natural_size(Size::ZERO);
    }

    /// Layout pass. After initialisation the current crop is preserved in
    /// normalized terms across the resize.
    pub fn set_container_size(&mut self, size: Size) -> Vec<CropEvent> {
        if size == self.store.container_size() {
            return Vec::new();
        }

        let previous = (self.store.is_initialized() && self.is_ready()).then(|| self.crop_rect());
        self.store.set_container_size(size);

        match previous {
            Some(rect) if self.is_ready() => {
                self.store
                    .restore_from_rect(&rect, self.props.zoom, self.props.aspect_ratio);
                Vec::new()
            }
            _ => self.try_initialize(),
        }
    }

    /// Switch between a fixed ratio and free-form. Commits immediately.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: Option<f64>) -> Vec<CropEvent> {
        let aspect_ratio = usable_ratio(aspect_ratio);
        if aspect_ratio == self.props.aspect_ratio {
            return Vec::new();
        }
        self.cancel_gestures();
        self.props.aspect_ratio = aspect_ratio;

        let rect = self.store.apply_aspect_ratio(aspect_ratio, self.props.zoom);
        log::debug!("aspect ratio set to {:?}", aspect_ratio);

        match rect {
            Some(rect) if self.store.is_initialized() => vec![CropEvent::CropChanged(rect)],
            _ => self.try_initialize(),
        }
    }

    /// External zoom change (e.g. a slider). Echoes of the value the view
    /// already holds are ignored; a real change shrinks a box that no longer
    /// fits, re-clamps the offset and commits the new rect.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<CropEvent> {
        let zoom = self.config.clamp_zoom(zoom);
        if zoom == self.props.zoom {
            return Vec::new();
        }
        self.props.zoom = zoom;

        if !self.store.is_initialized() {
            return self.try_initialize();
        }
        if !self.is_ready() {
            return Vec::new();
        }

        self.store
            .fit_crop_to_zoom(zoom, self.props.aspect_ratio, self.config.min_crop_size);
        let crop = self.store.crop_box_size(self.props.aspect_ratio);
        let offset = self
            .store
            .clamp_image_offset(self.store.image_offset(), zoom, crop);
        self.store.set_image_offset(offset);

        if self.active == ActiveSurface::None {
            vec![CropEvent::CropChanged(self.crop_rect())]
        } else {
            // The running gesture commits on release
            Vec::new()
        }
    }

    /// External rotation change. Rotation does not affect the crop rect.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.props.rotation = calculate_new_rotation(rotation, 0.0);
    }

    pub fn set_flip(&mut self, flip: Flip) {
        self.props.flip = flip;
    }

    /// Touches went down; `touches` lists every touch now down.
    pub fn pointer_down(&mut self, touches: &[Point]) -> Vec<CropEvent> {
        if !self.is_ready() || touches.is_empty() {
            return Vec::new();
        }
        let inputs = self.inputs();

        match self.active {
            ActiveSurface::None => {
                let corner = match touches {
                    [page] => self.overlay().and_then(|layout| layout.handle_at(*page)),
                    _ => None,
                };
                match corner.and_then(|c| Corner::ALL.iter().position(|&k| k == c)) {
                    Some(index) => {
                        self.corners[index].grant(touches[0], &self.store, &inputs);
                        self.active = ActiveSurface::Corner(index);
                    }
                    None => {
                        self.image_gesture.grant(touches, &self.store, &inputs);
                        self.active = ActiveSurface::Image;
                    }
                }
                Vec::new()
            }
            // An extra finger joins the running image gesture
            ActiveSurface::Image => self.pointer_move(touches),
            // Corners hold on to their single touch
            ActiveSurface::Corner(_) => Vec::new(),
        }
    }

    /// Touches moved; `touches` lists every touch still down.
    pub fn pointer_move(&mut self, touches: &[Point]) -> Vec<CropEvent> {
        if !self.is_ready() {
            return Vec::new();
        }
        let inputs = self.inputs();

        match self.active {
            ActiveSurface::Image => {
                let events =
                    self.image_gesture
                        .update(touches, &mut self.store, &inputs, &self.config);
                self.apply_live_events(&events);
                events
            }
            ActiveSurface::Corner(index) => {
                if let Some(page) = touches.first() {
                    self.corners[index].update(*page, &mut self.store, &inputs, &self.config);
                }
                Vec::new()
            }
            ActiveSurface::None => Vec::new(),
        }
    }

    /// Touches lifted; `remaining` lists the touches still down.
    pub fn pointer_up(&mut self, remaining: &[Point]) -> Vec<CropEvent> {
        let inputs = self.inputs();

        match self.active {
            ActiveSurface::Image if !remaining.is_empty() => self.pointer_move(remaining),
            ActiveSurface::Image => {
                self.active = ActiveSurface::None;
                self.image_gesture.release(&self.store, &inputs)
            }
            ActiveSurface::Corner(index) => {
                self.active = ActiveSurface::None;
                self.corners[index].release(&self.store, &inputs)
            }
            ActiveSurface::None => Vec::new(),
        }
    }

    /// The host took the pointer stream away. The last processed move stays.
    pub fn pointer_cancel(&mut self) {
        self.cancel_gestures();
    }

    fn cancel_gestures(&mut self) {
        self.image_gesture.terminate();
        for responder in &mut self.corners {
            responder.terminate();
        }
        self.active = ActiveSurface::None;
    }

    fn apply_live_events(&mut self, events: &[CropEvent]) {
        for event in events {
            match *event {
                CropEvent::ZoomChanged(zoom) => self.props.zoom = zoom,
                CropEvent::RotationChanged(rotation) => self.props.rotation = rotation,
                CropEvent::CropChanged(_) => {}
            }
        }
    }

    /// Establish the starting crop once geometry is ready: restore the
    /// persisted rect, or emit a default one.
    fn try_initialize(&mut self) -> Vec<CropEvent> {
        if self.store.is_initialized() || !self.is_ready() {
            return Vec::new();
        }
        let zoom = self.props.zoom;
        let aspect_ratio = self.props.aspect_ratio;
        self.store.mark_initialized();

        match self.initial_rect.take() {
            Some(rect) => {
                self.store.restore_from_rect(&rect, zoom, aspect_ratio);
                Vec::new()
            }
            None => {
                let rect = self
                    .store
                    .apply_aspect_ratio(aspect_ratio, zoom)
                    .unwrap_or_else(|| self.crop_rect());
                log::debug!("default crop rect {:?}", rect);
                vec![CropEvent::CropChanged(rect)]
            }
        }
    }
}
