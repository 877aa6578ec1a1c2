//! Measurement grid overlay.
//!
//! [`draw_grid`] computes what to draw; it never touches pixels. The result
//! is a [`GridDrawing`]: one list of line and label commands sharing a single
//! stroke colour and width, which [`crate::render`] rasterises.
//!
//! # Layout
//!
//! - Vertical lines at `x = k * cell` for `k = 0, 1, ...` up to and including
//!   the first `x >= canvas width`; horizontal lines likewise
//! - Labels carry the 1-based column/row index next to each line
//! - Diagonals draw an "X" inside each cell, confined to that cell

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::CanvasSpec;

/// Upper bound on the number of commands one drawing may hold.
pub const MAX_COMMANDS: u64 = 2_000_000;

/// Errors raised while laying out the grid.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GridError {
    /// The cell size is not strictly positive, or is so small that the grid
    /// would not terminate in reasonable time.
    #[error("Invalid cell size: {cell_size_mm} mm at {pixels_per_mm} px/mm")]
    InvalidCellSize {
        cell_size_mm: f64,
        pixels_per_mm: f64,
    },
}

/// A colour that can't be parsed from a `#rrggbb` string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid colour {0:?}, expected #rrggbb or #rgb")]
pub struct ParseColorError(pub String);

/// An sRGB colour, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        // from_str_radix alone would take a leading '+'
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Rgb::new(r * 17, g * 17, b * 17))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Grid appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridStyle {
    /// Stroke colour for lines and labels
    pub color: Rgb,
    /// Draw 1-based column/row indices
    pub show_labels: bool,
    /// Draw an "X" inside each cell
    pub show_diagonals: bool,
    /// Stroke width in pixels
    pub line_width_px: f32,
    /// Label glyph height in pixels
    pub font_size_px: f32,
    /// Gap between a line and its label
    pub label_padding_px: f64,
    /// Canvas fill behind the image
    pub background: Rgb,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            show_labels: true,
            show_diagonals: false,
            line_width_px: 2.0,
            font_size_px: 12.0,
            label_padding_px: 5.0,
            background: Rgb::WHITE,
        }
    }
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which family a grid line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    Vertical,
    Horizontal,
    Diagonal,
}

/// One entry of the grid path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawCommand {
    /// Straight segment from `from` to `to`.
    Line {
        kind: LineKind,
        from: Point,
        to: Point,
    },
    /// Text whose top-left corner sits at `at`.
    Label { text: String, at: Point },
}

/// Everything needed to paint the grid: commands plus the shared stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDrawing {
    pub commands: Vec<DrawCommand>,
    pub color: Rgb,
    pub line_width: f32,
    pub font_size: f32,
}

impl GridDrawing {
    fn empty(style: &GridStyle) -> Self {
        Self {
            commands: Vec::new(),
            color: style.color,
            line_width: style.line_width_px,
            font_size: style.font_size_px,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Line segments of one kind.
    pub fn lines(&self, kind: LineKind) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.commands.iter().filter_map(move |cmd| match cmd {
            DrawCommand::Line { kind: k, from, to } if *k == kind => Some((*from, *to)),
            _ => None,
        })
    }

    /// Labels with their anchor points.
    pub fn labels(&self) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Label { text, at } => Some((text.as_str(), *at)),
            _ => None,
        })
    }
}

/// Compute the grid for a `canvas_px_w x canvas_px_h` canvas.
///
/// # Errors
///
/// `GridError::InvalidCellSize` if `cell_size_mm * pixels_per_mm` is not a
/// strictly positive size, or the grid would exceed [`MAX_COMMANDS`]. A
/// zero-sized canvas is not an error: it yields an empty drawing.
pub fn draw_grid(
    canvas_px_w: f64,
    canvas_px_h: f64,
    cell_size_mm: f64,
    pixels_per_mm: f64,
    style: &GridStyle,
) -> Result<GridDrawing, GridError> {
    let invalid = GridError::InvalidCellSize {
        cell_size_mm,
        pixels_per_mm,
    };
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(cell_size_mm) || !usable(pixels_per_mm) {
        return Err(invalid);
    }
    let cell = cell_size_mm * pixels_per_mm;
    if !usable(cell) {
        return Err(invalid);
    }

    let mut drawing = GridDrawing::empty(style);
    if !usable(canvas_px_w) || !usable(canvas_px_h) {
        return Ok(drawing);
    }

    let columns = (canvas_px_w / cell).ceil() + 1.0;
    let rows = (canvas_px_h / cell).ceil() + 1.0;
    let mut estimate = columns + rows;
    if style.show_labels {
        estimate *= 2.0;
    }
    if style.show_diagonals {
        estimate += 2.0 * columns * rows;
    }
    if !estimate.is_finite() || estimate > MAX_COMMANDS as f64 {
        return Err(invalid);
    }

    let index_label = |pos: f64| format!("{}", (pos / pixels_per_mm / cell_size_mm).round() as u64 + 1);
    let pad = style.label_padding_px;

    for x in grid_positions(canvas_px_w, cell) {
        drawing.commands.push(DrawCommand::Line {
            kind: LineKind::Vertical,
            from: Point::new(x, 0.0),
            to: Point::new(x, canvas_px_h),
        });
        if style.show_labels {
            drawing.commands.push(DrawCommand::Label {
                text: index_label(x),
                at: Point::new(x + pad, pad),
            });
        }
    }

    for y in grid_positions(canvas_px_h, cell) {
        drawing.commands.push(DrawCommand::Line {
            kind: LineKind::Horizontal,
            from: Point::new(0.0, y),
            to: Point::new(canvas_px_w, y),
        });
        if style.show_labels {
            drawing.commands.push(DrawCommand::Label {
                text: index_label(y),
                at: Point::new(pad, y + pad),
            });
        }
    }

    if style.show_diagonals {
        for x in cell_origins(canvas_px_w, cell) {
            for y in cell_origins(canvas_px_h, cell) {
                drawing.commands.push(DrawCommand::Line {
                    kind: LineKind::Diagonal,
                    from: Point::new(x, y),
                    to: Point::new(x + cell, y + cell),
                });
                drawing.commands.push(DrawCommand::Line {
                    kind: LineKind::Diagonal,
                    from: Point::new(x, y + cell),
                    to: Point::new(x + cell, y),
                });
            }
        }
    }

    tracing::trace!(
        commands = drawing.commands.len(),
        cell_px = cell,
        "Computed grid drawing"
    );
    Ok(drawing)
}

/// [`draw_grid`] over the integer surface described by `canvas`.
pub fn draw_grid_for_canvas(
    canvas: &CanvasSpec,
    style: &GridStyle,
) -> Result<GridDrawing, GridError> {
    let (w, h) = canvas
        .pixel_dimensions()
        .map(|(w, h)| (f64::from(w), f64::from(h)))
        .unwrap_or((0.0, 0.0));
    draw_grid(w, h, canvas.cell_size_mm, canvas.pixels_per_mm, style)
}

/// Line positions `0, cell, 2 * cell, ...` through the first one `>= extent`.
fn grid_positions(extent: f64, cell: f64) -> impl Iterator<Item = f64> {
    let mut k = 0u64;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let pos = k as f64 * cell;
        if pos >= extent {
            done = true;
        }
        k += 1;
        Some(pos)
    })
}

/// Origins of the cells that start inside `[0, extent)`.
fn cell_origins(extent: f64, cell: f64) -> impl Iterator<Item = f64> {
    (0u64..)
        .map(move |k| k as f64 * cell)
        .take_while(move |&pos| pos < extent)
}
