//! Gridmaker Core - Image transform and grid rendering library
//!
//! This crate provides the core pipeline for Gridmaker: decoding an upload,
//! rotating/flipping/filtering it, cropping the transformed preview, fitting
//! it onto a physical canvas and overlaying a measurement grid.
//!
//! # Pipeline
//!
//! ```text
//! decode -> apply_adjustments -> crop -> place -> draw_grid -> render -> encode_png
//! ```
//!
//! Every stage is a pure function over owned or borrowed values; ordering of
//! overlapping requests is handled by [`session::PreviewSession`].

pub mod adjustments;
pub mod decode;
pub mod encode;
pub mod grid;
pub mod layout;
pub mod render;
pub mod session;
pub mod surface;
pub mod transform;

use thiserror::Error;

pub use adjustments::{AdjustmentError, AdjustmentState, Rotation};
pub use decode::{decode_image, DecodeError, FilterType, ImageMetadata, Raster};
pub use encode::{encode_png, EncodeError};
pub use grid::{draw_grid, DrawCommand, GridDrawing, GridError, GridStyle, Rgb};
pub use layout::{place, place_raster, CanvasSpec, LayoutError, Placement};
pub use render::{render_composite, render_grid_only, RenderError};
pub use session::{CropSelector, Generation, GridSession, PreviewSession, SessionError};
pub use surface::SurfaceError;
pub use transform::{apply_adjustments, crop, CropRect, TransformError};

/// Any error raised by the pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
