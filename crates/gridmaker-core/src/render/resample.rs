//! Image resampling for placement and on-screen previews.
//!
//! Uses the `image` crate's resize algorithms. All functions return new
//! rasters without modifying the input.

use crate::decode::{FilterType, Raster};
use crate::surface::{check_surface, SurfaceError};

/// Resize a raster to exact dimensions.
///
/// # Errors
///
/// Returns `SurfaceError` if the target size is zero or too large.
pub fn resize(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, SurfaceError> {
    check_surface(width, height)?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image().ok_or(SurfaceError {
        width: image.width,
        height: image.height,
    })?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(Raster::from_rgb_image(resized))
}

/// Resize a raster so its longest edge is at most `max_edge`, preserving
/// aspect ratio. Rasters that already fit are returned unchanged.
///
/// The crop widget works best on a screen-sized preview; the selection is
/// then scaled back with [`crate::transform::CropRect::from_normalized`].
pub fn resize_to_fit(
    image: &Raster,
    max_edge: u32,
    filter: FilterType,
) -> Result<Raster, SurfaceError> {
    if max_edge == 0 {
        return Err(SurfaceError {
            width: 0,
            height: 0,
        });
    }

    let (src_width, src_height) = (image.width, image.height);
    if src_width <= max_edge && src_height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);
    resize(image, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
