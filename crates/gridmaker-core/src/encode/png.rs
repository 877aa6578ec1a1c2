//! PNG encoding for the downloadable grid image.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::Raster;

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGB raster to PNG bytes.
///
/// # Example
///
/// ```
/// use gridmaker_core::{encode::encode_png, Raster};
///
/// let png = encode_png(&Raster::filled(4, 4, [255, 255, 255])).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn encode_png(image: &Raster) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    tracing::debug!(width, height, bytes = bytes.len(), "Encoded PNG");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn gradient(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(128);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&Raster::filled(100, 100, [128, 128, 128])).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let image = gradient(37, 21);
        let png = encode_png(&image).unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_encode_png_single_pixel() {
        let png = encode_png(&Raster::filled(1, 1, [255, 0, 0])).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_invalid_pixel_data() {
        let image = Raster {
            width: 100,
            height: 100,
            pixels: vec![128; 99 * 100 * 3],
        };
        assert_eq!(
            encode_png(&image),
            Err(EncodeError::InvalidPixelData {
                expected: 30_000,
                actual: 29_700,
            })
        );
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let image = Raster {
            width: 0,
            height: 100,
            pixels: vec![],
        };
        assert!(matches!(
            encode_png(&image),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: valid rasters always encode, deterministically.
        #[test]
        fn prop_valid_input_encodes_deterministically(
            (width, height) in (1u32..=40, 1u32..=40),
            fill in any::<[u8; 3]>(),
        ) {
            let image = Raster::filled(width, height, fill);
            let first = encode_png(&image).unwrap();
            let second = encode_png(&image).unwrap();
            prop_assert_eq!(&first[1..4], b"PNG");
            prop_assert_eq!(first, second);
        }

        /// Property: a mismatched buffer length is always rejected.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in (1u32..=30, 1u32..=30),
            delta in prop_oneof![-10i64..=-1, 1i64..=10],
        ) {
            let expected = (width * height * 3) as i64;
            let len = (expected + delta).max(0) as usize;
            let image = Raster { width, height, pixels: vec![0; len] };
            let is_invalid = matches!(encode_png(&image), Err(EncodeError::InvalidPixelData { .. }));
            prop_assert!(is_invalid);
        }
    }
}
