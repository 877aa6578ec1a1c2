//! Composite rendering bindings.

use crate::grid::{canvas_from_js, style_from_js};
use crate::types::{js_error, JsRaster};
use gridmaker_core::decode::FilterType;
use gridmaker_core::render;
use wasm_bindgen::prelude::*;

/// Composite `image` and the grid onto the canvas.
///
/// Set `high_quality` for the download (Lanczos3 resampling); leave it off
/// for the on-screen preview.
#[wasm_bindgen]
pub fn render_composite(
    image: &JsRaster,
    canvas: JsValue,
    style: JsValue,
    high_quality: bool,
) -> Result<JsRaster, JsValue> {
    let canvas = canvas_from_js(canvas)?;
    let style = style_from_js(style)?;
    let filter = if high_quality {
        FilterType::Lanczos3
    } else {
        FilterType::Bilinear
    };

    render::render_composite_with(&image.to_raster(), &canvas, &style, filter)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Render the grid alone, before any image has been cropped.
#[wasm_bindgen]
pub fn render_grid(canvas: JsValue, style: JsValue) -> Result<JsRaster, JsValue> {
    let canvas = canvas_from_js(canvas)?;
    let style = style_from_js(style)?;
    render::render_grid_only(&canvas, &style)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}
