//! Adjustment WASM bindings.
//!
//! This module provides JavaScript bindings for [`AdjustmentState`], the
//! rotate/flip/colour-filter settings of the editor panel.

use crate::types::{js_error, JsRaster};
use gridmaker_core::adjustments::AdjustmentState;
use gridmaker_core::transform;
use wasm_bindgen::prelude::*;

/// Editor adjustments wrapper for JavaScript
#[wasm_bindgen]
#[derive(Default)]
pub struct JsAdjustments {
    inner: AdjustmentState,
}

#[wasm_bindgen]
impl JsAdjustments {
    /// Create adjustments at their defaults (100% filters, no rotation or flips)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    /// Set brightness percentage (clamped to 0-200)
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.set_brightness(value);
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    /// Set saturation percentage (clamped to 0-200)
    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.set_saturation(value);
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    /// Set contrast percentage (clamped to 0-200)
    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.set_contrast(value);
    }

    /// Rotation in degrees: 0, 90, 180 or 270
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> u16 {
        self.inner.rotation.degrees()
    }

    /// Set rotation in degrees. Must be a multiple of 90; wraps modulo 360.
    pub fn set_rotation(&mut self, degrees: i32) -> Result<(), JsValue> {
        self.inner.set_rotation_degrees(degrees).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn flip_horizontal(&self) -> bool {
        self.inner.flip_horizontal
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_horizontal(&mut self, value: bool) {
        self.inner.flip_horizontal = value;
    }

    #[wasm_bindgen(getter)]
    pub fn flip_vertical(&self) -> bool {
        self.inner.flip_vertical
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_vertical(&mut self, value: bool) {
        self.inner.flip_vertical = value;
    }

    pub fn rotate_clockwise(&mut self) {
        self.inner.rotate_clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.inner.rotate_counter_clockwise();
    }

    /// Restore every adjustment to its default
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Check if all adjustments are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain JS object; missing fields take their defaults
    pub fn from_json(value: JsValue) -> Result<JsAdjustments, JsValue> {
        let inner: AdjustmentState = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self {
            inner: inner.normalized(),
        })
    }
}

impl JsAdjustments {
    pub(crate) fn from_state(inner: AdjustmentState) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &AdjustmentState {
        &self.inner
    }
}

/// Flip, rotate and filter an image, returning the transformed preview.
///
/// # Example (TypeScript)
/// ```typescript
/// const adj = new JsAdjustments();
/// adj.brightness = 120;
/// adj.rotate_clockwise();
///
/// const preview = apply_adjustments(sourceImage, adj);
/// ```
#[wasm_bindgen]
pub fn apply_adjustments(image: &JsRaster, adjustments: &JsAdjustments) -> Result<JsRaster, JsValue> {
    transform::apply_adjustments(&image.to_raster(), adjustments.inner())
        .map(JsRaster::from_raster)
        .map_err(js_error)
}
