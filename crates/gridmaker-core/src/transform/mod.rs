//! Geometric transforms: quarter-turn rotation, flips and cropping.
//!
//! # Transform Order
//!
//! A preview render runs, in this order:
//! 1. Flip in the source frame (horizontal, then vertical)
//! 2. Rotation about the centre by a quarter turn
//! 3. Colour filter (brightness, saturation, contrast)
//!
//! Cropping then runs against the transformed raster.
//!
//! # Coordinate System
//!
//! - Rotation is clockwise as seen on screen (y axis points down)
//! - Crop rectangles are integer pixels in the transformed raster's space
//! - Origin is top-left corner

mod crop;
mod engine;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::surface::SurfaceError;

pub use crop::{crop, CropRect};
pub use engine::{apply_adjustments, map_source_point};

/// Errors raised by the transform stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The source raster is malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The output surface cannot be allocated.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// The crop rectangle does not overlap the raster.
    #[error("Crop rectangle {rect:?} does not intersect a {width}x{height} raster")]
    InvalidCropRect {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}
