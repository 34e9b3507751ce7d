//! Types shared by the image source functions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Errors raised while reading an image source.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a format the decoder understands.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The format was recognized but the data is broken or truncated.
    #[error("Corrupted or incomplete image file: {0}")]
    Corrupted(String),

    /// The header reports a zero-sized image.
    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
            other => DecodeError::Corrupted(other.to_string()),
        }
    }
}

/// EXIF orientation values (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Mirrored across the top-left to bottom-right diagonal
    Transpose = 5,
    Rotate90CW = 6,
    /// Mirrored across the top-right to bottom-left diagonal
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Orientations 5-8 display the stored image with width and height swapped.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// Apply the orientation to stored `(width, height)`.
    pub fn oriented(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Camera information used by the EXIF watermark border.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub orientation: Orientation,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens_model: Option<String>,
    /// Capture time as written by the camera (`YYYY:MM:DD HH:MM:SS`)
    pub date_taken: Option<String>,
    pub iso: Option<u32>,
    /// Exposure time in seconds
    pub exposure_time: Option<f64>,
    pub f_number: Option<f64>,
    /// Focal length in mm
    pub focal_length: Option<f64>,
}

impl ImageMetadata {
    /// `"Make Model"`, dropping the make when the model already starts with it.
    pub fn camera_line(&self) -> Option<String> {
        match (self.camera_make.as_deref(), self.camera_model.as_deref()) {
            (Some(make), Some(model)) => {
                let starts_with_make = model
                    .get(..make.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(make));
                if starts_with_make {
                    Some(model.to_string())
                } else {
                    Some(format!("{} {}", make, model))
                }
            }
            (Some(make), None) => Some(make.to_string()),
            (None, Some(model)) => Some(model.to_string()),
            (None, None) => None,
        }
    }

    /// Shooting parameters such as `"50mm f/1.8 1/250s ISO100"`. Missing
    /// values are skipped; `None` when nothing is known.
    pub fn exposure_line(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(4);
        if let Some(focal) = self.focal_length.filter(|v| *v > 0.0) {
            parts.push(format!("{}mm", format_decimal(focal)));
        }
        if let Some(f_number) = self.f_number.filter(|v| *v > 0.0) {
            parts.push(format!("f/{}", format_decimal(f_number)));
        }
        if let Some(exposure) = self.exposure_time.filter(|v| *v > 0.0) {
            parts.push(format_exposure(exposure));
        }
        if let Some(iso) = self.iso {
            parts.push(format!("ISO{}", iso));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// One decimal place, without a trailing `.0`.
fn format_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

fn format_exposure(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{}s", format_decimal(seconds))
    } else {
        format!("1/{:.0}s", (1.0 / seconds).round())
    }
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// The natural size fed to the crop view.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Non-empty, with a pixel buffer that matches `width x height`. The
    /// fields are public, so transforms check this before indexing.
    pub fn is_valid(&self) -> bool {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3));
        !self.is_empty() && expected == Some(self.pixels.len())
    }

    /// RGB value at `(x, y)`. Out-of-range coordinates are a caller bug.
    #[inline]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}
