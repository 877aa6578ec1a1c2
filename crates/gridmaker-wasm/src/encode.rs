//! Image encoding WASM bindings.
//!
//! ```typescript
//! import { encode_png } from '@gridmaker/wasm';
//!
//! const png = encode_png(composite);
//! const url = URL.createObjectURL(new Blob([png], { type: 'image/png' }));
//! ```

use crate::types::{js_error, JsRaster};
use gridmaker_core::encode;
use wasm_bindgen::prelude::*;

/// Encode a raster to PNG bytes.
///
/// # Errors
///
/// Returns an error if the raster's pixel buffer doesn't match its
/// dimensions or either dimension is zero.
#[wasm_bindgen]
pub fn encode_png(image: &JsRaster) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_raster()).map_err(js_error)
}
