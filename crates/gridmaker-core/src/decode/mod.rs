//! Image decoding for Gridmaker uploads.
//!
//! This module provides functionality for:
//! - Decoding uploaded JPEG and PNG bytes into a [`Raster`]
//! - Applying EXIF orientation so the raster matches what the browser shows
//! - Reading natural dimensions without a full decode
//!
//! # Architecture
//!
//! Decoding is the only pipeline stage the UI treats as asynchronous. The
//! functions here are synchronous; the caller decides when "raster ready"
//! fires and tags the request (see [`crate::session`]).

mod types;
mod upload;

pub use types::{DecodeError, FilterType, ImageMetadata, Orientation, Raster};
pub use upload::{decode_image, decode_image_no_orientation, get_orientation, read_metadata};
