//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode an uploaded JPEG or PNG, applying EXIF orientation
//! - [`read_metadata`] - Natural dimensions and orientation without a full decode
//! - [`resize_to_fit`] - Shrink a raster for the crop widget
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize_to_fit } from '@gridmaker/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const preview = resize_to_fit(image, 1600, 1);
//! ```

use crate::types::{filter_from_u8, js_error, JsRaster};
use gridmaker_core::{decode, render};
use wasm_bindgen::prelude::*;

/// Decode an uploaded image.
///
/// # Errors
///
/// Returns an error string if the bytes are empty, not a supported format,
/// or corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image(bytes)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Read `{ width, height, orientation }` from the image header.
#[wasm_bindgen]
pub fn read_metadata(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let metadata = decode::read_metadata(bytes).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&metadata).map_err(js_error)
}

/// Resize so the longest edge is at most `max_edge`.
///
/// `filter`: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize_to_fit(image: &JsRaster, max_edge: u32, filter: u8) -> Result<JsRaster, JsValue> {
    render::resize_to_fit(&image.to_raster(), max_edge, filter_from_u8(filter))
        .map(JsRaster::from_raster)
        .map_err(js_error)
}
