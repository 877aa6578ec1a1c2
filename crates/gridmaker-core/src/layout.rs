//! Canvas geometry and aspect-preserving placement.
//!
//! A [`CanvasSpec`] describes the physical print area in millimetres and the
//! display scale in pixels per millimetre. [`place`] letterboxes an image
//! into that area: the image keeps its aspect ratio, touches two opposite
//! edges, and is centred on both axes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::Raster;

/// Display scale used when none is given (2 pixels per millimetre).
pub const DEFAULT_PIXELS_PER_MM: f64 = 2.0;

/// Errors raised by canvas geometry.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LayoutError {
    /// A size that must be strictly positive is zero, negative or not finite.
    #[error("Invalid dimensions: {what} must be positive, got {value}")]
    InvalidDimensions { what: &'static str, value: f64 },
}

/// Physical canvas size and grid cell size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasSpec {
    /// Canvas width in millimetres
    #[serde(rename = "widthMM")]
    pub width_mm: f64,
    /// Canvas height in millimetres
    #[serde(rename = "heightMM")]
    pub height_mm: f64,
    /// Edge length of one grid cell in millimetres
    #[serde(rename = "cellSizeMM")]
    pub cell_size_mm: f64,
    /// Display scale
    #[serde(rename = "pixelsPerMM")]
    pub pixels_per_mm: f64,
}

impl Default for CanvasSpec {
    /// The empty form: nothing is drawn until every size is entered.
    fn default() -> Self {
        Self {
            width_mm: 0.0,
            height_mm: 0.0,
            cell_size_mm: 0.0,
            pixels_per_mm: DEFAULT_PIXELS_PER_MM,
        }
    }
}

impl CanvasSpec {
    pub fn new(width_mm: f64, height_mm: f64, cell_size_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            cell_size_mm,
            pixels_per_mm: DEFAULT_PIXELS_PER_MM,
        }
    }

    pub fn with_pixels_per_mm(mut self, pixels_per_mm: f64) -> Self {
        self.pixels_per_mm = pixels_per_mm;
        self
    }

    /// Check every size is strictly positive and finite.
    pub fn validate(&self) -> Result<(), LayoutError> {
        positive("widthMM", self.width_mm)?;
        positive("heightMM", self.height_mm)?;
        positive("cellSizeMM", self.cell_size_mm)?;
        positive("pixelsPerMM", self.pixels_per_mm)?;
        Ok(())
    }

    /// Fractional canvas size in pixels.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            self.width_mm * self.pixels_per_mm,
            self.height_mm * self.pixels_per_mm,
        )
    }

    /// Grid cell edge in pixels.
    pub fn cell_size_px(&self) -> f64 {
        self.cell_size_mm * self.pixels_per_mm
    }

    /// Width over height, once both are usable.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let ratio = self.width_mm / self.height_mm;
        (self.width_mm > 0.0 && self.height_mm > 0.0 && ratio.is_finite()).then_some(ratio)
    }

    /// Integer surface size, truncated as a drawing surface would.
    pub fn pixel_dimensions(&self) -> Result<(u32, u32), LayoutError> {
        positive("widthMM", self.width_mm)?;
        positive("heightMM", self.height_mm)?;
        positive("pixelsPerMM", self.pixels_per_mm)?;

        let (w, h) = self.pixel_size();
        let w = positive("canvas width in pixels", w.trunc())?;
        let h = positive("canvas height in pixels", h.trunc())?;
        Ok((
            w.min(f64::from(u32::MAX)) as u32,
            h.min(f64::from(u32::MAX)) as u32,
        ))
    }
}

/// Where to draw an image on the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

impl Placement {
    /// Pixel-snapped `(x, y, width, height)`, each at least 1 pixel wide.
    pub fn rounded(&self) -> (i64, i64, u32, u32) {
        (
            self.offset_x.round() as i64,
            self.offset_y.round() as i64,
            (self.draw_width.round() as u32).max(1),
            (self.draw_height.round() as u32).max(1),
        )
    }
}

/// Centre an `image_width x image_height` image on the canvas, preserving
/// its aspect ratio.
///
/// # Errors
///
/// `LayoutError::InvalidDimensions` if either image dimension is zero or
/// the canvas geometry is not strictly positive.
pub fn place(
    image_width: u32,
    image_height: u32,
    canvas: &CanvasSpec,
) -> Result<Placement, LayoutError> {
    positive("image width", f64::from(image_width))?;
    positive("image height", f64::from(image_height))?;
    positive("widthMM", canvas.width_mm)?;
    positive("heightMM", canvas.height_mm)?;
    positive("pixelsPerMM", canvas.pixels_per_mm)?;

    let (canvas_w, canvas_h) = canvas.pixel_size();
    positive("canvas width in pixels", canvas_w)?;
    positive("canvas height in pixels", canvas_h)?;

    let image_aspect = f64::from(image_width) / f64::from(image_height);
    let canvas_aspect = canvas_w / canvas_h;

    let (draw_width, draw_height) = if image_aspect > canvas_aspect {
        // Relatively wider than the canvas: letterbox top and bottom
        (canvas_w, canvas_w / image_aspect)
    } else {
        // Letterbox left and right
        (canvas_h * image_aspect, canvas_h)
    };

    Ok(Placement {
        offset_x: (canvas_w - draw_width) / 2.0,
        offset_y: (canvas_h - draw_height) / 2.0,
        draw_width,
        draw_height,
    })
}

/// [`place`] for a decoded raster.
pub fn place_raster(image: &Raster, canvas: &CanvasSpec) -> Result<Placement, LayoutError> {
    place(image.width, image.height, canvas)
}

fn positive(what: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidDimensions { what, value })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the placement is contained, centred and aspect-preserving.
        #[test]
        fn prop_placement_contained_and_centred(
            (image_w, image_h) in (1u32..=5000, 1u32..=5000),
            (width_mm, height_mm) in (1.0f64..=1000.0, 1.0f64..=1000.0),
            pixels_per_mm in 0.5f64..=10.0,
        ) {
            let canvas = CanvasSpec::new(width_mm, height_mm, 10.0).with_pixels_per_mm(pixels_per_mm);
            let (canvas_w, canvas_h) = canvas.pixel_size();
            let p = place(image_w, image_h, &canvas).unwrap();
            let tol = 1e-9 * canvas_w.max(canvas_h);

            prop_assert!(p.offset_x >= -tol && p.offset_y >= -tol);
            prop_assert!(p.offset_x + p.draw_width <= canvas_w + tol);
            prop_assert!(p.offset_y + p.draw_height <= canvas_h + tol);

            // Centred on both axes
            prop_assert!(((canvas_w - p.draw_width - p.offset_x) - p.offset_x).abs() <= tol);
            prop_assert!(((canvas_h - p.draw_height - p.offset_y) - p.offset_y).abs() <= tol);

            // One axis is filled
            let fills_w = (p.draw_width - canvas_w).abs() <= tol;
            let fills_h = (p.draw_height - canvas_h).abs() <= tol;
            prop_assert!(fills_w || fills_h);

            let image_aspect = f64::from(image_w) / f64::from(image_h);
            prop_assert!((p.draw_width / p.draw_height - image_aspect).abs() <= 1e-9 * image_aspect.max(1.0));
        }
    }
}
