//! The adjustment engine: flip, quarter-turn rotation and colour filter.
//!
//! The render is modelled on a 2D drawing context:
//!
//! ```text
//! translate(out_w / 2, out_h / 2)
//! rotate(rotation)
//! scale(flip_h ? -1 : 1, flip_v ? -1 : 1)
//! filter = brightness() saturate() contrast()
//! draw(source, -src_w / 2, -src_h / 2)
//! ```
//!
//! A source point `p` therefore lands at `T · R · S · (p - src_centre)`.
//! Because every rotation is a quarter turn the mapping is a pixel
//! permutation, so it is carried out with exact `image::imageops` flips and
//! rotations rather than resampling.

use image::{imageops, RgbImage};

use super::TransformError;
use crate::adjustments::{apply_color_filter, AdjustmentState, Rotation};
use crate::decode::{DecodeError, Raster};
use crate::surface::check_surface;

/// Apply rotation, flips and the colour filter to `source`.
///
/// The output is `source.height x source.width` for 90 and 270 degree
/// rotations and `source.width x source.height` otherwise. Percentages are
/// clamped to `[0, 200]` before use. The function is pure: identical inputs
/// produce byte-identical outputs.
///
/// # Errors
///
/// - `TransformError::Decode` if the source pixel buffer is malformed
/// - `TransformError::Surface` if the output surface cannot be allocated
pub fn apply_adjustments(
    source: &Raster,
    adjustments: &AdjustmentState,
) -> Result<Raster, TransformError> {
    source.validate()?;
    let adj = adjustments.normalized();

    let (out_w, out_h) = adj.rotation.output_dimensions(source.width, source.height);
    check_surface(out_w, out_h)?;

    let rgb = source.to_rgb_image().ok_or(DecodeError::MalformedRaster {
        width: source.width,
        height: source.height,
        expected: source.width as usize * source.height as usize * 3,
        actual: source.pixels.len(),
    })?;

    let mut output = Raster::from_rgb_image(orient(rgb, &adj));
    apply_color_filter(&mut output.pixels, &adj);

    tracing::trace!(
        src_width = source.width,
        src_height = source.height,
        rotation = adj.rotation.degrees(),
        flip_h = adj.flip_horizontal,
        flip_v = adj.flip_vertical,
        "Applied adjustments"
    );

    Ok(output)
}

/// Flip in the source frame, then rotate about the centre.
fn orient(img: RgbImage, adj: &AdjustmentState) -> RgbImage {
    let img = if adj.flip_horizontal {
        imageops::flip_horizontal(&img)
    } else {
        img
    };
    let img = if adj.flip_vertical {
        imageops::flip_vertical(&img)
    } else {
        img
    };

    match adj.rotation {
        Rotation::Deg0 => img,
        Rotation::Deg90 => imageops::rotate90(&img),
        Rotation::Deg180 => imageops::rotate180(&img),
        Rotation::Deg270 => imageops::rotate270(&img),
    }
}

/// Map a point in source coordinates to the transformed raster.
///
/// This is the drawing-context matrix described in the module docs, useful
/// for carrying annotations (or a previous selection) across a transform.
pub fn map_source_point(
    adjustments: &AdjustmentState,
    src_width: u32,
    src_height: u32,
    x: f64,
    y: f64,
) -> (f64, f64) {
    let (out_w, out_h) = adjustments
        .rotation
        .output_dimensions(src_width, src_height);

    let sx = if adjustments.flip_horizontal { -1.0 } else { 1.0 };
    let sy = if adjustments.flip_vertical { -1.0 } else { 1.0 };
    let px = (x - f64::from(src_width) / 2.0) * sx;
    let py = (y - f64::from(src_height) / 2.0) * sy;

    let theta = adjustments.rotation.radians();
    let (sin, cos) = theta.sin_cos();
    let rx = px * cos - py * sin;
    let ry = px * sin + py * cos;

    (rx + f64::from(out_w) / 2.0, ry + f64::from(out_h) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pixel gets a distinct colour so permutations are observable.
    fn test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(x as u8);
                pixels.push(y as u8);
                pixels.push(((x * 7 + y * 13) % 256) as u8);
            }
        }
        Raster::new(width, height, pixels)
    }

    fn with_rotation(rotation: Rotation) -> AdjustmentState {
        AdjustmentState {
            rotation,
            ..AdjustmentState::default()
        }
    }

    const ALL_ROTATIONS: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn test_identity_is_byte_identical() {
        let img = test_image(9, 4);
        let result = apply_adjustments(&img, &AdjustmentState::default()).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_output_dimensions_per_rotation() {
        let img = test_image(80, 60);
        for rotation in ALL_ROTATIONS {
            let result = apply_adjustments(&img, &with_rotation(rotation)).unwrap();
            let expected = if rotation.swaps_dimensions() {
                (60, 80)
            } else {
                (80, 60)
            };
            assert_eq!((result.width, result.height), expected, "{rotation:?}");
        }
    }

    #[test]
    fn test_rotate_90_is_clockwise() {
        // Left pixel red, right pixel green
        let img = Raster::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
        let result = apply_adjustments(&img, &with_rotation(Rotation::Deg90)).unwrap();
        assert_eq!((result.width, result.height), (1, 2));
        // Clockwise: the left edge becomes the top edge
        assert_eq!(result.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(result.pixel(0, 1), Some([0, 255, 0]));
    }

    #[test]
    fn test_rotate_270_is_counter_clockwise() {
        let img = Raster::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
        let result = apply_adjustments(&img, &with_rotation(Rotation::Deg270)).unwrap();
        assert_eq!(result.pixel(0, 0), Some([0, 255, 0]));
        assert_eq!(result.pixel(0, 1), Some([255, 0, 0]));
    }

    #[test]
    fn test_flip_horizontal() {
        let img = Raster::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
        let mut adj = AdjustmentState::default();
        adj.flip_horizontal = true;
        let result = apply_adjustments(&img, &adj).unwrap();
        assert_eq!(result.pixel(0, 0), Some([0, 255, 0]));
        assert_eq!(result.pixel(1, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_flip_is_applied_before_rotation() {
        // 2x1: flip then rotate 90 puts the original right pixel on top
        let img = Raster::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
        let mut adj = with_rotation(Rotation::Deg90);
        adj.flip_horizontal = true;
        let result = apply_adjustments(&img, &adj).unwrap();
        assert_eq!(result.pixel(0, 0), Some([0, 255, 0]));
        assert_eq!(result.pixel(0, 1), Some([255, 0, 0]));
    }

    #[test]
    fn test_pixels_follow_drawing_context_matrix() {
        let img = test_image(5, 3);
        for rotation in ALL_ROTATIONS {
            for (flip_h, flip_v) in [(false, false), (true, false), (false, true), (true, true)] {
                let adj = AdjustmentState {
                    rotation,
                    flip_horizontal: flip_h,
                    flip_vertical: flip_v,
                    ..AdjustmentState::default()
                };
                let result = apply_adjustments(&img, &adj).unwrap();

                for y in 0..img.height {
                    for x in 0..img.width {
                        let (ox, oy) = map_source_point(
                            &adj,
                            img.width,
                            img.height,
                            x as f64 + 0.5,
                            y as f64 + 0.5,
                        );
                        let (ox, oy) = (ox.floor() as u32, oy.floor() as u32);
                        assert_eq!(
                            result.pixel(ox, oy),
                            img.pixel(x, y),
                            "{adj:?} at ({x}, {y})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let img = test_image(7, 3);
        let quarter = with_rotation(Rotation::Deg90);
        let mut current = img.clone();
        for _ in 0..4 {
            current = apply_adjustments(&current, &quarter).unwrap();
        }
        assert_eq!(current, img);
    }

    #[test]
    fn test_color_filter_applied_after_geometry() {
        let img = Raster::filled(4, 2, [100, 100, 100]);
        let mut adj = with_rotation(Rotation::Deg90);
        adj.brightness = 50.0;
        let result = apply_adjustments(&img, &adj).unwrap();
        assert_eq!((result.width, result.height), (2, 4));
        assert!(result.pixels.iter().all(|&v| v == 50));
    }

    #[test]
    fn test_malformed_source_is_decode_error() {
        let img = Raster {
            width: 3,
            height: 3,
            pixels: vec![0u8; 5],
        };
        let result = apply_adjustments(&img, &AdjustmentState::default());
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_empty_source_is_surface_error() {
        let img = Raster::new(0, 0, vec![]);
        let result = apply_adjustments(&img, &AdjustmentState::default());
        assert!(matches!(result, Err(TransformError::Surface(_))));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let img = test_image(6, 6);
        let adj = AdjustmentState {
            brightness: 130.0,
            saturation: 70.0,
            contrast: 120.0,
            rotation: Rotation::Deg270,
            flip_horizontal: true,
            flip_vertical: false,
        };
        let first = apply_adjustments(&img, &adj).unwrap();
        let second = apply_adjustments(&img, &adj).unwrap();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn rotation_strategy() -> impl Strategy<Value = Rotation> {
        prop_oneof![
            Just(Rotation::Deg0),
            Just(Rotation::Deg90),
            Just(Rotation::Deg180),
            Just(Rotation::Deg270),
        ]
    }

    fn create_test_image(width: u32, height: u32) -> Raster {
        let pixels = (0..(width * height * 3) as usize)
            .map(|i| (i % 251) as u8)
            .collect();
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Property: 90/270 swap dimensions, 0/180 keep them.
        #[test]
        fn prop_dimensions_follow_rotation(
            (width, height) in (1u32..=40, 1u32..=40),
            rotation in rotation_strategy(),
            flip_h in any::<bool>(),
        ) {
            let img = create_test_image(width, height);
            let adj = AdjustmentState { rotation, flip_horizontal: flip_h, ..AdjustmentState::default() };
            let result = apply_adjustments(&img, &adj).unwrap();
            prop_assert_eq!((result.width, result.height), rotation.output_dimensions(width, height));
            prop_assert_eq!(result.pixels.len(), img.pixels.len());
        }

        /// Property: geometry alone only permutes pixels.
        #[test]
        fn prop_geometry_preserves_histogram(
            (width, height) in (1u32..=20, 1u32..=20),
            rotation in rotation_strategy(),
            flip_h in any::<bool>(),
            flip_v in any::<bool>(),
        ) {
            let img = create_test_image(width, height);
            let adj = AdjustmentState {
                rotation,
                flip_horizontal: flip_h,
                flip_vertical: flip_v,
                ..AdjustmentState::default()
            };
            let result = apply_adjustments(&img, &adj).unwrap();
            let mut before: Vec<&[u8]> = img.pixels.chunks(3).collect();
            let mut after: Vec<&[u8]> = result.pixels.chunks(3).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }

        /// Property: a double flip on the same axis is the identity.
        #[test]
        fn prop_double_flip_identity((width, height) in (1u32..=20, 1u32..=20)) {
            let img = create_test_image(width, height);
            let mut adj = AdjustmentState::default();
            adj.flip_horizontal = true;
            let once = apply_adjustments(&img, &adj).unwrap();
            let twice = apply_adjustments(&once, &adj).unwrap();
            prop_assert_eq!(twice, img);
        }
    }
}
