//! WASM bindings for cropping the transformed preview.
//!
//! Crop coordinates always refer to the raster the crop widget displays,
//! i.e. the output of `apply_adjustments`.

use crate::types::{js_error, JsRaster};
use gridmaker_core::transform::{crop, CropRect};
use wasm_bindgen::prelude::*;

/// Crop a pixel rectangle out of `image`.
///
/// A rectangle overhanging the image is clamped; one with no overlap is an error.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const { x, y, width, height } = cropper.getData(true);
/// const cropped = crop_image(preview, x, y, width, height);
/// ```
#[wasm_bindgen]
pub fn crop_image(
    image: &JsRaster,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<JsRaster, JsValue> {
    crop(&image.to_raster(), CropRect::new(x, y, width, height))
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Crop using normalized coordinates in the range [0, 1].
///
/// ```typescript
/// // Crop the center 50% of the image
/// const cropped = crop_image_normalized(preview, 0.25, 0.25, 0.5, 0.5);
/// ```
#[wasm_bindgen]
pub fn crop_image_normalized(
    image: &JsRaster,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> Result<JsRaster, JsValue> {
    let rect = CropRect::from_normalized(left, top, width, height, image.width(), image.height());
    crop_image(image, rect.x, rect.y, rect.width, rect.height)
}
