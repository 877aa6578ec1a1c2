//! Canvas placement and grid layout bindings.
//!
//! Settings objects cross the boundary as plain JS objects with camelCase
//! keys (`{ widthMM, heightMM, cellSizeMM }`, `{ color: "#000000", showLabels }`).

use crate::types::js_error;
use gridmaker_core::grid::{draw_grid_for_canvas, GridStyle};
use gridmaker_core::layout::{place, CanvasSpec};
use wasm_bindgen::prelude::*;

pub(crate) fn canvas_from_js(value: JsValue) -> Result<CanvasSpec, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

/// `undefined` and `null` select the default style.
pub(crate) fn style_from_js(value: JsValue) -> Result<GridStyle, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(GridStyle::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

/// Centre an image on the canvas, returning
/// `{ offsetX, offsetY, drawWidth, drawHeight }` in canvas pixels.
#[wasm_bindgen]
pub fn place_image(image_width: u32, image_height: u32, canvas: JsValue) -> Result<JsValue, JsValue> {
    let canvas = canvas_from_js(canvas)?;
    let placement = place(image_width, image_height, &canvas).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&placement).map_err(js_error)
}

/// Grid draw commands for the canvas, for callers painting with their own 2D context.
///
/// Returns `{ commands, color, lineWidth, fontSize }`; each command is
/// `{ type: "line", kind, from, to }` or `{ type: "label", text, at }`.
#[wasm_bindgen]
pub fn grid_commands(canvas: JsValue, style: JsValue) -> Result<JsValue, JsValue> {
    let canvas = canvas_from_js(canvas)?;
    let style = style_from_js(style)?;
    let drawing = draw_grid_for_canvas(&canvas, &style).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&drawing).map_err(js_error)
}
