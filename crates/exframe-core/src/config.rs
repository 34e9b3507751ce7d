//! Tunables for the crop engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for configuration values the engine cannot work with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Edge padding must be zero or positive.
    #[error("Edge padding must be non-negative, got {0}")]
    NegativePadding(f64),

    /// The minimum crop size must be positive.
    #[error("Minimum crop size must be positive, got {0}")]
    InvalidMinCropSize(f64),

    /// Zoom bounds must be positive and ordered.
    #[error("Invalid zoom range [{min}, {max}]")]
    InvalidZoomRange { min: f64, max: f64 },

    /// Handle and border measurements must be positive.
    #[error("Invalid handle geometry: {0}")]
    InvalidHandle(&'static str),
}

/// Crop engine configuration.
///
/// Deserializes from a partial object; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    /// Padding removed from each container side before fitting the image
    pub edge_padding: f64,
    /// Smallest crop box edge a corner drag can produce
    pub min_crop_size: f64,
    /// Lower zoom bound
    pub min_zoom: f64,
    /// Upper zoom bound
    pub max_zoom: f64,
    /// Side of the square touch target centred on each corner
    pub handle_hit_size: f64,
    /// Length of each arm of the visible corner mark
    pub handle_mark_length: f64,
    /// Thickness of the visible crop border
    pub border_width: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            edge_padding: 20.0,
            min_crop_size: 50.0,
            min_zoom: 1.0,
            max_zoom: 5.0,
            handle_hit_size: 44.0,
            handle_mark_length: 20.0,
            border_width: 2.0,
        }
    }
}

impl CropConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.edge_padding >= 0.0 && self.edge_padding.is_finite()) {
            return Err(ConfigError::NegativePadding(self.edge_padding));
        }
        if !(self.min_crop_size > 0.0 && self.min_crop_size.is_finite()) {
            return Err(ConfigError::InvalidMinCropSize(self.min_crop_size));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.handle_hit_size > 0.0) {
            return Err(ConfigError::InvalidHandle("hit size must be positive"));
        }
        if !(self.handle_mark_length > 0.0) {
            return Err(ConfigError::InvalidHandle("mark length must be positive"));
        }
        if !(self.border_width >= 0.0) {
            return Err(ConfigError::InvalidHandle("border width must be non-negative"));
        }
        // Hit targets must stay larger than what is drawn
        if self.handle_hit_size < self.handle_mark_length {
            return Err(ConfigError::InvalidHandle(
                "hit size must not be smaller than the visible mark",
            ));
        }
        Ok(())
    }

    /// Clamp a zoom value into the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.max(self.min_zoom).min(self.max_zoom)
    }
}
