//! Reading image bytes: natural size, pixels and EXIF.

use std::io::Cursor;

use exif::{Exif, Field, In, Reader, Tag, Value};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodedImage, ImageMetadata, Orientation};
use crate::geometry::Size;

fn image_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))
}

/// Natural size of the image as displayed, read from the header only.
///
/// EXIF orientations 5-8 swap width and height, matching what
/// [`decode_image`] produces.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidFormat`] for unrecognized bytes and
/// [`DecodeError::Empty`] when the header reports no pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Result<Size, DecodeError> {
    let (width, height) = image_reader(bytes)?.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty { width, height });
    }

    let (width, height) = read_orientation(bytes).oriented(width, height);
    Ok(Size::new(width as f64, height as f64))
}

/// Decode to RGB8 with EXIF orientation applied.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidFormat`] or [`DecodeError::Corrupted`] when
/// the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = read_orientation(bytes);
    let img = image_reader(bytes)?.decode()?;
    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::Empty {
            width: img.width(),
            height: img.height(),
        });
    }

    log::debug!(
        "decoded {}x{} image with orientation {:?}",
        img.width(),
        img.height(),
        orientation
    );
    Ok(DecodedImage::from_rgb_image(
        apply_orientation(img, orientation).into_rgb8(),
    ))
}

/// Camera metadata for the watermark border. Missing or unreadable EXIF
/// yields an empty value.
pub fn read_metadata(bytes: &[u8]) -> ImageMetadata {
    let Some(exif) = read_exif(bytes) else {
        return ImageMetadata::default();
    };

    ImageMetadata {
        orientation: orientation_of(&exif),
        camera_make: ascii_field(&exif, Tag::Make),
        camera_model: ascii_field(&exif, Tag::Model),
        lens_model: ascii_field(&exif, Tag::LensModel),
        date_taken: ascii_field(&exif, Tag::DateTimeOriginal)
            .or_else(|| ascii_field(&exif, Tag::DateTime)),
        iso: field(&exif, Tag::PhotographicSensitivity).and_then(|f| f.value.get_uint(0)),
        exposure_time: rational_field(&exif, Tag::ExposureTime),
        f_number: rational_field(&exif, Tag::FNumber),
        focal_length: rational_field(&exif, Tag::FocalLength),
    }
}

/// EXIF orientation, [`Orientation::Normal`] when absent.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    read_exif(bytes)
        .map(|exif| orientation_of(&exif))
        .unwrap_or_default()
}

fn read_exif(bytes: &[u8]) -> Option<Exif> {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(exif),
        Err(e) => {
            log::debug!("no usable EXIF: {}", e);
            None
        }
    }
}

fn orientation_of(exif: &Exif) -> Orientation {
    field(exif, Tag::Orientation)
        .and_then(|f| f.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    match &field(exif, tag)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn rational_field(exif: &Exif, tag: Tag) -> Option<f64> {
    match &field(exif, tag)?.value {
        Value::Rational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
