//! Gridmaker WASM - WebAssembly bindings for Gridmaker
//!
//! This crate provides WASM bindings to expose the gridmaker-core pipeline
//! to the browser.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Upload decoding and preview resizing
//! - `adjustments` - Rotate, flip and colour filter settings
//! - `transform` - Cropping the transformed preview
//! - `grid` - Canvas placement and grid draw commands
//! - `render` - Composite rendering
//! - `encode` - PNG export
//! - `session` - Generation-tagged preview and grid sessions
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsGridSession } from '@gridmaker/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const grid = new JsGridSession({ widthMM: 300, heightMM: 200, cellSizeMM: 10 });
//! grid.set_image(image);
//! const png = grid.export_png();
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod decode;
mod encode;
mod grid;
mod render;
mod session;
mod transform;
mod types;

// Re-export public types
pub use adjustments::{apply_adjustments, JsAdjustments};
pub use decode::{decode_image, read_metadata, resize_to_fit};
pub use encode::encode_png;
pub use grid::{grid_commands, place_image};
pub use render::{render_composite, render_grid};
pub use session::{Cropper, JsGridSession, JsPreviewSession};
pub use transform::{crop_image, crop_image_normalized};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "gridmaker-wasm {} ready",
        version()
    )));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
