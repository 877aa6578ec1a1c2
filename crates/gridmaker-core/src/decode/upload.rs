//! Decoding of uploaded image bytes with EXIF orientation handling.
//!
//! Browsers display photos with their EXIF orientation applied, and the crop
//! widget works against what the user sees, so decoding applies the same
//! correction before the raster enters the pipeline.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, ImageMetadata, Orientation, Raster};

/// Decode uploaded image bytes (JPEG or PNG), applying EXIF orientation.
///
/// # Errors
///
/// - `DecodeError::Empty` for zero-length input
/// - `DecodeError::InvalidFormat` if the format cannot be recognized
/// - `DecodeError::CorruptedFile` if the decoder rejects the data
pub fn decode_image(bytes: &[u8]) -> Result<Raster, DecodeError> {
    let img = decode_dynamic(bytes)?;
    let orientation = extract_orientation(bytes);
    let oriented = apply_orientation(img, orientation);

    let raster = Raster::from_rgb_image(oriented.into_rgb8());
    tracing::debug!(
        width = raster.width,
        height = raster.height,
        ?orientation,
        "Decoded upload"
    );
    Ok(raster)
}

/// Decode uploaded image bytes without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<Raster, DecodeError> {
    let img = decode_dynamic(bytes)?;
    Ok(Raster::from_rgb_image(img.into_rgb8()))
}

/// Read the natural dimensions and orientation without decoding pixels.
pub fn read_metadata(bytes: &[u8]) -> Result<ImageMetadata, DecodeError> {
    let reader = guessed_reader(bytes)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(ImageMetadata {
        width,
        height,
        orientation: extract_orientation(bytes),
    })
}

/// Extract the EXIF orientation value (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    guessed_reader(bytes)?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
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
