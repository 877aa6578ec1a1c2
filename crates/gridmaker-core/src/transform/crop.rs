//! Crop extraction from the transformed preview.
//!
//! The crop widget is shown the transformed raster, so its selection is
//! already expressed in that raster's pixel space and is used as-is. There is
//! no remapping back to the untransformed upload.
//!
//! # Bounds Policy
//!
//! - A rectangle that overhangs the raster is clamped to the intersection
//! - A rectangle with no overlap (or zero size) is rejected
//! - A full-raster rectangle returns a copy of the raster

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::Raster;
use crate::surface::check_surface;

/// An axis-aligned selection in the pixel space of one specific raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Selection covering the whole raster.
    pub fn full(raster: &Raster) -> Self {
        Self::new(0, 0, raster.width, raster.height)
    }

    /// Build a selection from normalized coordinates (0.0 to 1.0).
    ///
    /// Values are clamped to the unit range and rounded to whole pixels.
    pub fn from_normalized(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        raster_width: u32,
        raster_height: u32,
    ) -> Self {
        let w = f64::from(raster_width);
        let h = f64::from(raster_height);
        let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        Self {
            x: (unit(left) * w).round() as u32,
            y: (unit(top) * h).round() as u32,
            width: (unit(width) * w).round() as u32,
            height: (unit(height) * h).round() as u32,
        }
    }

    /// Largest selection of `aspect` (width / height) centred in a
    /// `raster_width x raster_height` raster.
    ///
    /// The crop widget starts from this box so the crop matches the canvas
    /// shape. Returns `None` for an empty raster or a non-positive aspect.
    pub fn centered_with_aspect(raster_width: u32, raster_height: u32, aspect: f64) -> Option<Self> {
        if raster_width == 0 || raster_height == 0 || !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }

        let w = f64::from(raster_width);
        let h = f64::from(raster_height);
        let (width, height) = if w / h > aspect {
            ((h * aspect).round().clamp(1.0, w), h)
        } else {
            (w, (w / aspect).round().clamp(1.0, h))
        };

        Some(Self {
            x: ((w - width) / 2.0).floor() as u32,
            y: ((h - height) / 2.0).floor() as u32,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Intersection with a `width x height` raster, or `None` when empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CropRect> {
        let left = self.x.min(width);
        let top = self.y.min(height);
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);

        if right <= left || bottom <= top {
            return None;
        }
        Some(CropRect::new(left, top, right - left, bottom - top))
    }

    /// True when the rectangle lies fully inside a `width x height` raster.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }
}

/// Extract `rect` from `transformed` into a new raster.
///
/// # Errors
///
/// - `TransformError::InvalidCropRect` if `rect` does not overlap the raster
/// - `TransformError::Decode` if the source pixel buffer is malformed
/// - `TransformError::Surface` if the output surface cannot be allocated
pub fn crop(transformed: &Raster, rect: CropRect) -> Result<Raster, TransformError> {
    transformed.validate()?;

    let region = rect
        .clamp_to(transformed.width, transformed.height)
        .ok_or(TransformError::InvalidCropRect {
            rect,
            width: transformed.width,
            height: transformed.height,
        })?;

    // Fast path: full crop returns a clone
    if region == CropRect::full(transformed) {
        return Ok(transformed.clone());
    }

    let len = check_surface(region.width, region.height)?;
    let mut output = Vec::with_capacity(len);

    // Copy pixel data row by row
    let src_stride = transformed.width as usize * 3;
    let row_bytes = region.width as usize * 3;
    for y in region.y..region.bottom() {
        let start = y as usize * src_stride + region.x as usize * 3;
        output.extend_from_slice(&transformed.pixels[start..start + row_bytes]);
    }

    if region != rect {
        tracing::debug!(requested = ?rect, clamped = ?region, "Clamped crop rectangle");
    }

    Ok(Raster::new(region.width, region.height, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn test_full_crop_is_identical() {
        let img = test_image(50, 40);
        let result = crop(&img, CropRect::full(&img)).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRect::new(2, 2, 6, 6)).unwrap();

        assert_eq!((result.width, result.height), (6, 6));
        // Value at (2, 2) = 2 * 10 + 2 = 22
        assert_eq!(result.pixels[0], 22);
        // Value at (7, 7) = 77
        assert_eq!(result.pixel(5, 5), Some([77, 77, 77]));
    }

    #[test]
    fn test_overhanging_rect_is_clamped() {
        let img = test_image(800, 600);
        let result = crop(&img, CropRect::new(700, 0, 200, 100)).unwrap();
        assert_eq!((result.width, result.height), (100, 100));
        assert_eq!(result.pixel(0, 0), img.pixel(700, 0));
        assert_eq!(result.pixel(99, 99), img.pixel(799, 99));
    }

    #[test]
    fn test_rect_outside_bounds_is_rejected() {
        let img = test_image(800, 600);
        let rect = CropRect::new(900, 0, 200, 100);
        assert_eq!(
            crop(&img, rect),
            Err(TransformError::InvalidCropRect {
                rect,
                width: 800,
                height: 600,
            })
        );
    }

    #[test]
    fn test_rect_touching_edge_is_rejected() {
        let img = test_image(10, 10);
        assert!(crop(&img, CropRect::new(10, 0, 5, 5)).is_err());
        assert!(crop(&img, CropRect::new(0, 10, 5, 5)).is_err());
    }

    #[test]
    fn test_zero_size_rect_is_rejected() {
        let img = test_image(10, 10);
        assert!(crop(&img, CropRect::new(2, 2, 0, 4)).is_err());
        assert!(crop(&img, CropRect::new(2, 2, 4, 0)).is_err());
    }

    #[test]
    fn test_huge_rect_does_not_overflow() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRect::new(5, 5, u32::MAX, u32::MAX)).unwrap();
        assert_eq!((result.width, result.height), (5, 5));
    }

    #[test]
    fn test_crop_rectangular() {
        let img = test_image(200, 100);
        let result = crop(&img, CropRect::new(0, 0, 50, 100)).unwrap();
        assert_eq!((result.width, result.height), (50, 100));
    }

    #[test]
    fn test_from_normalized() {
        let rect = CropRect::from_normalized(0.25, 0.25, 0.5, 0.5, 100, 80);
        assert_eq!(rect, CropRect::new(25, 20, 50, 40));

        let clamped = CropRect::from_normalized(-0.5, f64::NAN, 2.0, 1.0, 10, 10);
        assert_eq!(clamped, CropRect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_centered_with_aspect() {
        // 3:2 box in a 4:3 raster spans the full width
        assert_eq!(
            CropRect::centered_with_aspect(800, 600, 1.5),
            Some(CropRect::new(0, 33, 800, 533))
        );
        // Square box in a landscape raster spans the full height
        assert_eq!(
            CropRect::centered_with_aspect(300, 100, 1.0),
            Some(CropRect::new(100, 0, 100, 100))
        );
        assert_eq!(CropRect::centered_with_aspect(0, 100, 1.0), None);
        assert_eq!(CropRect::centered_with_aspect(100, 100, 0.0), None);
        assert_eq!(CropRect::centered_with_aspect(100, 100, f64::NAN), None);
    }

    #[test]
    fn test_is_within() {
        assert!(CropRect::new(0, 0, 10, 10).is_within(10, 10));
        assert!(!CropRect::new(1, 0, 10, 10).is_within(10, 10));
        assert!(!CropRect::new(0, 0, 0, 10).is_within(10, 10));
    }

    #[test]
    fn test_deserialize_widget_selection() {
        let rect: CropRect =
            serde_json::from_str(r#"{"x": 4, "y": 8, "width": 15, "height": 16}"#).unwrap();
        assert_eq!(rect, CropRect::new(4, 8, 15, 16));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=60, 1u32..=60)
    }

    fn rect_strategy() -> impl Strategy<Value = CropRect> {
        (0u32..=80, 0u32..=80, 0u32..=80, 0u32..=80)
            .prop_map(|(x, y, w, h)| CropRect::new(x, y, w, h))
    }

    fn create_test_image(width: u32, height: u32) -> Raster {
        let pixels = (0..(width * height * 3) as usize)
            .map(|i| (i % 256) as u8)
            .collect();
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Property: output dimensions equal the clamped rectangle.
        #[test]
        fn prop_output_matches_clamped_rect(
            (width, height) in dimensions_strategy(),
            rect in rect_strategy(),
        ) {
            let img = create_test_image(width, height);
            match rect.clamp_to(width, height) {
                Some(region) => {
                    let result = crop(&img, rect).unwrap();
                    prop_assert_eq!((result.width, result.height), (region.width, region.height));
                    prop_assert_eq!(result.pixels.len(), (region.width * region.height * 3) as usize);
                    prop_assert!(region.is_within(width, height));
                }
                None => {
                    let is_invalid_rect = matches!(crop(&img, rect), Err(TransformError::InvalidCropRect { .. }));
                    prop_assert!(is_invalid_rect);
                }
            }
        }

        /// Property: every output pixel comes from the matching source pixel.
        #[test]
        fn prop_pixels_copied_from_offset(
            (width, height) in dimensions_strategy(),
            rect in rect_strategy(),
        ) {
            let img = create_test_image(width, height);
            if let Some(region) = rect.clamp_to(width, height) {
                let result = crop(&img, rect).unwrap();
                for y in 0..result.height {
                    for x in 0..result.width {
                        prop_assert_eq!(result.pixel(x, y), img.pixel(region.x + x, region.y + y));
                    }
                }
            }
        }

        /// Property: the aspect box always fits and is centred.
        #[test]
        fn prop_centered_with_aspect_fits(
            (width, height) in dimensions_strategy(),
            aspect in 0.1f64..=10.0,
        ) {
            let rect = CropRect::centered_with_aspect(width, height, aspect).unwrap();
            prop_assert!(rect.is_within(width, height));
            prop_assert!(rect.width == width || rect.height == height);
            prop_assert!((width - rect.right()).abs_diff(rect.x) <= 1);
            prop_assert!((height - rect.bottom()).abs_diff(rect.y) <= 1);
        }

        /// Property: cropping is deterministic.
        #[test]
        fn prop_crop_is_deterministic(
            (width, height) in dimensions_strategy(),
            rect in rect_strategy(),
        ) {
            let img = create_test_image(width, height);
            prop_assert_eq!(crop(&img, rect), crop(&img, rect));
        }

        /// Property: full crop returns the original raster.
        #[test]
        fn prop_full_crop_returns_original((width, height) in dimensions_strategy()) {
            let img = create_test_image(width, height);
            prop_assert_eq!(crop(&img, CropRect::full(&img)).unwrap(), img);
        }
    }
}
