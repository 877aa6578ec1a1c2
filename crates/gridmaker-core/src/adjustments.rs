//! Image adjustment state and the colour filter.
//!
//! Adjustments follow the percentage convention of 2D raster filters:
//! `brightness(b%) saturate(s%) contrast(c%)`, where 100 is identity,
//! 0 fully attenuates and 200 doubles the effect.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Saturation
//! 3. Contrast
//!
//! Each stage clamps its result to the displayable range before the next
//! stage runs, as a filter chain over an 8-bit surface would.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted percentage for brightness, saturation and contrast.
pub const PERCENT_MIN: f32 = 0.0;
/// Highest accepted percentage for brightness, saturation and contrast.
pub const PERCENT_MAX: f32 = 200.0;
/// The identity percentage.
pub const PERCENT_IDENTITY: f32 = 100.0;

/// Errors raised while building adjustment values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdjustmentError {
    /// Rotation is not a multiple of 90 degrees.
    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),
}

/// A quarter-turn rotation, clockwise as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotation in radians.
    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// True for 90 and 270, which swap the bounding box.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Next quarter turn clockwise, wrapping 270 → 0.
    pub fn clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Next quarter turn counter-clockwise, wrapping 0 → 270.
    pub fn counter_clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg270,
            Rotation::Deg90 => Rotation::Deg0,
            Rotation::Deg180 => Rotation::Deg90,
            Rotation::Deg270 => Rotation::Deg180,
        }
    }

    /// Output `(width, height)` for a source of the given size.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = AdjustmentError;

    /// Accepts any multiple of 90, normalised modulo 360 (`-90` is 270).
    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        if degrees % 90 != 0 {
            return Err(AdjustmentError::InvalidRotation(degrees));
        }
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            _ => Ok(Rotation::Deg270),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Colour and geometry adjustments for one preview render.
///
/// This is a plain value: the UI builds a new one on every slider tick and
/// passes it explicitly to [`crate::transform::apply_adjustments`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustmentState {
    /// Brightness percentage (0 to 200)
    pub brightness: f32,
    /// Saturation percentage (0 to 200)
    pub saturation: f32,
    /// Contrast percentage (0 to 200)
    pub contrast: f32,
    /// Quarter-turn rotation
    pub rotation: Rotation,
    /// Mirror along the vertical axis
    pub flip_horizontal: bool,
    /// Mirror along the horizontal axis
    pub flip_vertical: bool,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            brightness: PERCENT_IDENTITY,
            saturation: PERCENT_IDENTITY,
            contrast: PERCENT_IDENTITY,
            rotation: Rotation::Deg0,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl AdjustmentState {
    /// Create a new AdjustmentState with identity values
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to identity (explicit reset or a new upload).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// True when the colour filter would leave pixels unchanged.
    pub fn is_identity_filter(&self) -> bool {
        let n = self.normalized();
        n.brightness == PERCENT_IDENTITY
            && n.saturation == PERCENT_IDENTITY
            && n.contrast == PERCENT_IDENTITY
    }

    /// Copy with every percentage clamped to `[0, 200]`.
    pub fn normalized(&self) -> Self {
        Self {
            brightness: clamp_percent(self.brightness),
            saturation: clamp_percent(self.saturation),
            contrast: clamp_percent(self.contrast),
            ..*self
        }
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.brightness = clamp_percent(value);
    }

    pub fn set_saturation(&mut self, value: f32) {
        self.saturation = clamp_percent(value);
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.contrast = clamp_percent(value);
    }

    /// Set rotation from integer degrees.
    pub fn set_rotation_degrees(&mut self, degrees: i32) -> Result<(), AdjustmentError> {
        self.rotation = Rotation::try_from(degrees)?;
        Ok(())
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.rotation = self.rotation.counter_clockwise();
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }
}

/// Clamp a percentage into `[0, 200]`; non-finite values fall back to 100.
#[inline]
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(PERCENT_MIN, PERCENT_MAX)
    } else {
        PERCENT_IDENTITY
    }
}

/// Apply the brightness/saturation/contrast filter to RGB pixels in place.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `adjustments` - Percentages are clamped before use; geometry is ignored
pub fn apply_color_filter(pixels: &mut [u8], adjustments: &AdjustmentState) {
    let adj = adjustments.normalized();
    if adj.is_identity_filter() {
        return;
    }

    let brightness = adj.brightness / 100.0;
    let saturation = adj.saturation / 100.0;
    let contrast = adj.contrast / 100.0;

    for chunk in pixels.chunks_exact_mut(3) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        if adj.brightness != PERCENT_IDENTITY {
            (r, g, b) = apply_brightness(r, g, b, brightness);
        }
        if adj.saturation != PERCENT_IDENTITY {
            (r, g, b) = apply_saturate(r, g, b, saturation);
        }
        if adj.contrast != PERCENT_IDENTITY {
            (r, g, b) = apply_contrast(r, g, b, contrast);
        }

        chunk[0] = to_byte(r);
        chunk[1] = to_byte(g);
        chunk[2] = to_byte(b);
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn clamp3(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// Linear brightness.
///
/// Formula: `output = input * amount`
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    clamp3(r * amount, g * amount, b * amount)
}

/// Saturation using the luminance-preserving filter matrix.
///
/// `amount = 0` yields greyscale, `1` is identity, `2` doubles saturation.
#[inline]
fn apply_saturate(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    let s = amount;
    let nr = (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b;
    let ng = (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b;
    let nb = (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b;
    clamp3(nr, ng, nb)
}

/// Contrast around mid-grey.
///
/// Formula: `output = (input - 0.5) * amount + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    let midpoint = 0.5;
    clamp3(
        (r - midpoint) * amount + midpoint,
        (g - midpoint) * amount + midpoint,
        (b - midpoint) * amount + midpoint,
    )
}
