//! Canvas compositing.
//!
//! Paints the background, the letterboxed image, and the grid overlay onto
//! one `tiny-skia` surface and reads it back as an RGB [`Raster`].
//!
//! # Drawing order
//!
//! 1. Background fill ([`GridStyle::background`])
//! 2. Image, resized to the rounded [`Placement`](crate::layout::Placement)
//! 3. Grid lines, stroked as a single path
//! 4. Labels, rasterised from an SVG text layer with the embedded face

mod labels;
mod resample;

pub use labels::{labels_svg, LABEL_FONT_FAMILY};
pub use resample::{resize, resize_to_fit};

use thiserror::Error;
use tiny_skia::{Color, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::decode::{DecodeError, FilterType, Raster};
use crate::grid::{draw_grid_for_canvas, DrawCommand, GridDrawing, GridError, GridStyle, Rgb};
use crate::layout::{place_raster, CanvasSpec, LayoutError};
use crate::surface::{check_surface, SurfaceError};

/// Errors raised while compositing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Failed to lay out grid labels: {0}")]
    Labels(String),
}

/// Composite `image` and the grid onto the canvas, using the preview filter.
///
/// # Errors
///
/// - `RenderError::Layout` if the canvas size or scale is not strictly positive
/// - `RenderError::Grid` if the cell size cannot produce a usable grid
/// - `RenderError::Surface` if the canvas surface cannot be allocated
/// - `RenderError::Decode` if `image` has a malformed pixel buffer
pub fn render_composite(
    image: &Raster,
    canvas: &CanvasSpec,
    style: &GridStyle,
) -> Result<Raster, RenderError> {
    render_composite_with(image, canvas, style, FilterType::Bilinear)
}

/// [`render_composite`] with an explicit resampling filter.
///
/// Exports use [`FilterType::Lanczos3`]; interactive previews stay bilinear.
pub fn render_composite_with(
    image: &Raster,
    canvas: &CanvasSpec,
    style: &GridStyle,
    filter: FilterType,
) -> Result<Raster, RenderError> {
    image.validate()?;
    // Cell size is left to the grid so it reports as `GridError`
    canvas.pixel_dimensions()?;

    let drawing = draw_grid_for_canvas(canvas, style)?;
    let mut pixmap = new_surface(canvas, style.background)?;

    let (x, y, width, height) = place_raster(image, canvas)?.rounded();
    let scaled = resize(image, width, height, filter)?;
    let layer = raster_to_pixmap(&scaled)?;
    pixmap.draw_pixmap(
        clamp_i32(x),
        clamp_i32(y),
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    paint_grid(&mut pixmap, &drawing)?;

    tracing::debug!(
        canvas_width = pixmap.width(),
        canvas_height = pixmap.height(),
        image_width = width,
        image_height = height,
        commands = drawing.commands.len(),
        "Rendered composite"
    );

    Ok(pixmap_to_raster(&pixmap))
}

/// Render the grid on a plain background, without an image.
pub fn render_grid_only(canvas: &CanvasSpec, style: &GridStyle) -> Result<Raster, RenderError> {
    canvas.pixel_dimensions()?;

    let drawing = draw_grid_for_canvas(canvas, style)?;
    let mut pixmap = new_surface(canvas, style.background)?;
    paint_grid(&mut pixmap, &drawing)?;

    Ok(pixmap_to_raster(&pixmap))
}

fn new_surface(canvas: &CanvasSpec, background: Rgb) -> Result<Pixmap, RenderError> {
    let (width, height) = canvas.pixel_dimensions()?;
    check_surface(width, height)?;

    let mut pixmap = Pixmap::new(width, height).ok_or(SurfaceError { width, height })?;
    pixmap.fill(Color::from_rgba8(background.r, background.g, background.b, 255));
    Ok(pixmap)
}

fn paint_grid(pixmap: &mut Pixmap, drawing: &GridDrawing) -> Result<(), RenderError> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(drawing.color.r, drawing.color.g, drawing.color.b, 255);
    paint.anti_alias = true;

    let mut lines = PathBuilder::new();
    for command in &drawing.commands {
        if let DrawCommand::Line { from, to, .. } = command {
            lines.move_to(from.x as f32, from.y as f32);
            lines.line_to(to.x as f32, to.y as f32);
        }
    }

    if let Some(path) = lines.finish() {
        let stroke = Stroke {
            width: drawing.line_width.max(0.0),
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    labels::paint_labels(pixmap, drawing)
}

fn raster_to_pixmap(raster: &Raster) -> Result<Pixmap, RenderError> {
    let err = SurfaceError {
        width: raster.width,
        height: raster.height,
    };
    let size = IntSize::from_wh(raster.width, raster.height).ok_or(err)?;

    let mut rgba = Vec::with_capacity(raster.pixels.len() / 3 * 4);
    for px in raster.pixels.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }

    Pixmap::from_vec(rgba, size).ok_or(RenderError::Surface(err))
}

fn pixmap_to_raster(pixmap: &Pixmap) -> Raster {
    let mut pixels = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    Raster::new(pixmap.width(), pixmap.height(), pixels)
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
