//! Stateful preview and grid sessions for the editor page.
//!
//! Generation tags cross the boundary as plain numbers. A worker computing a
//! preview hands its tag back with the result; stale results are dropped.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const session = new JsPreviewSession();
//! session.load_source(decode_image(bytes));
//! const preview = session.render();
//!
//! const cropper = new Cropper(img, { ready: () => session.prepare_cropper(cropper) });
//! const cropped = session.crop(cropper);
//! ```

use crate::adjustments::JsAdjustments;
use crate::grid::{canvas_from_js, style_from_js};
use crate::types::{js_error, JsRaster};
use gridmaker_core::session::{CropSelector, Generation, GridSession, PreviewSession};
use gridmaker_core::transform::CropRect;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// A cropperjs `Cropper` instance showing the current preview.
    pub type Cropper;

    #[wasm_bindgen(method, js_name = getData)]
    fn get_data(this: &Cropper, rounded: bool) -> JsValue;

    #[wasm_bindgen(method, js_name = zoomTo)]
    fn zoom_to(this: &Cropper, ratio: f64);
}

/// The subset of `Cropper.getData()` the pipeline reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
struct CropperData {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl CropperData {
    /// Whole-pixel selection; the part left of or above the image is dropped.
    fn to_rect(self) -> CropRect {
        let pixel = |v: f64| if v.is_finite() { v.round().max(0.0) } else { 0.0 };
        let left = pixel(self.x);
        let top = pixel(self.y);
        let right = pixel(self.x + self.width);
        let bottom = pixel(self.y + self.height);

        CropRect::new(
            left as u32,
            top as u32,
            (right - left).max(0.0) as u32,
            (bottom - top).max(0.0) as u32,
        )
    }
}

/// Read a `getData()` result, falling back to an empty selection.
///
/// An unreadable result is reported on the console so the eventual
/// `InvalidCropRect` can be traced back to the widget.
fn selection_from_data(data: JsValue) -> CropRect {
    match serde_wasm_bindgen::from_value::<CropperData>(data) {
        Ok(data) => data.to_rect(),
        Err(e) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "Ignoring unreadable crop selection: {e}"
            )));
            CropRect::default()
        }
    }
}

impl CropSelector for Cropper {
    fn selected_rect(&self) -> CropRect {
        selection_from_data(self.get_data(true))
    }

    fn set_zoom(&mut self, factor: f64) {
        self.zoom_to(factor);
    }
}

/// A selection that was already read out of the widget.
struct FixedSelection(CropRect);

impl CropSelector for FixedSelection {
    fn selected_rect(&self) -> CropRect {
        self.0
    }

    fn set_zoom(&mut self, _factor: f64) {}
}

fn tag_to_js(tag: Generation) -> f64 {
    tag.value() as f64
}

fn tag_from_js(tag: f64) -> Generation {
    Generation::from(if tag.is_finite() && tag > 0.0 { tag as u64 } else { 0 })
}

/// Source image, adjustments and the last good preview.
#[wasm_bindgen]
#[derive(Default)]
pub struct JsPreviewSession {
    inner: PreviewSession,
}

#[wasm_bindgen]
impl JsPreviewSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over with a new upload. Resets adjustments; returns the new tag.
    pub fn load_source(&mut self, image: &JsRaster) -> f64 {
        tag_to_js(self.inner.load_source(image.to_raster()))
    }

    /// Current adjustments (a copy).
    pub fn adjustments(&self) -> JsAdjustments {
        JsAdjustments::from_state(*self.inner.adjustments())
    }

    /// Store new adjustments; returns the tag their preview must carry.
    pub fn set_adjustments(&mut self, adjustments: &JsAdjustments) -> f64 {
        tag_to_js(self.inner.set_adjustments(*adjustments.inner()))
    }

    /// Issue a new tag, making every earlier one stale.
    pub fn request(&mut self) -> f64 {
        tag_to_js(self.inner.request())
    }

    pub fn is_current(&self, tag: f64) -> bool {
        self.inner.is_current(tag_from_js(tag))
    }

    /// Install a preview computed elsewhere. Returns `false` if `tag` is stale.
    pub fn complete(&mut self, tag: f64, image: &JsRaster) -> bool {
        self.inner.complete(tag_from_js(tag), image.to_raster())
    }

    /// Recompute the preview now and return it.
    ///
    /// On error the previous preview stays available through `preview()`.
    pub fn render(&mut self) -> Result<JsRaster, JsValue> {
        self.inner
            .render()
            .map(|raster| JsRaster::from_raster(raster.clone()))
            .map_err(js_error)
    }

    /// The last good preview, if any.
    pub fn preview(&self) -> Option<JsRaster> {
        self.inner.preview().cloned().map(JsRaster::from_raster)
    }

    /// Zoom a cropper that has just become ready.
    pub fn prepare_cropper(&self, cropper: Cropper) {
        let mut cropper = cropper;
        self.inner.prepare_selector(&mut cropper);
    }

    /// Crop the preview to the cropper's current selection.
    pub fn crop(&self, cropper: &Cropper) -> Result<JsRaster, JsValue> {
        self.inner
            .crop_with(cropper)
            .map(JsRaster::from_raster)
            .map_err(js_error)
    }

    /// Crop the preview to an explicit pixel rectangle.
    pub fn crop_rect(&self, x: u32, y: u32, width: u32, height: u32) -> Result<JsRaster, JsValue> {
        let selection = FixedSelection(CropRect::new(x, y, width, height));
        self.inner
            .crop_with(&selection)
            .map(JsRaster::from_raster)
            .map_err(js_error)
    }
}

/// Canvas settings and the accepted crop.
#[wasm_bindgen]
#[derive(Default)]
pub struct JsGridSession {
    inner: GridSession,
}

#[wasm_bindgen]
impl JsGridSession {
    /// `style` may be `undefined` for the default look.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: JsValue, style: JsValue) -> Result<JsGridSession, JsValue> {
        Ok(Self {
            inner: GridSession::new(canvas_from_js(canvas)?, style_from_js(style)?),
        })
    }

    pub fn set_canvas(&mut self, canvas: JsValue) -> Result<(), JsValue> {
        self.inner.set_canvas(canvas_from_js(canvas)?);
        Ok(())
    }

    pub fn set_style(&mut self, style: JsValue) -> Result<(), JsValue> {
        self.inner.set_style(style_from_js(style)?);
        Ok(())
    }

    pub fn set_image(&mut self, image: &JsRaster) {
        self.inner.set_image(image.to_raster());
    }

    pub fn clear_image(&mut self) {
        self.inner.clear_image();
    }

    pub fn has_image(&self) -> bool {
        self.inner.image().is_some()
    }

    /// Crop `preview` through the cropper and keep the result.
    pub fn accept_crop(&mut self, preview: &JsPreviewSession, cropper: &Cropper) -> Result<(), JsValue> {
        self.inner
            .accept_crop(&preview.inner, cropper)
            .map(|_| ())
            .map_err(js_error)
    }

    /// Starting crop box `{ x, y, width, height }` matching the canvas shape,
    /// or `undefined` until the canvas size is set.
    pub fn initial_crop(&self, preview: &JsRaster) -> Result<JsValue, JsValue> {
        let rect = self.inner.initial_crop(&preview.to_raster());
        serde_wasm_bindgen::to_value(&rect).map_err(js_error)
    }

    /// On-screen composite.
    pub fn render(&self) -> Result<JsRaster, JsValue> {
        self.inner
            .render()
            .map(JsRaster::from_raster)
            .map_err(js_error)
    }

    /// Full-quality composite as PNG bytes for download.
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.export_png().map_err(js_error)
    }
}
