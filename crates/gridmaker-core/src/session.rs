//! Preview state and last-writer-wins request ordering.
//!
//! Every input change (slider move, new upload) issues a fresh
//! [`Generation`]. A result is installed only when its tag is still the
//! latest one issued, so a slow recomputation that finishes after a newer one
//! can never overwrite it. Failures and stale results leave the last good
//! preview in place.
//!
//! The interactive crop box is not part of this crate; it is reached through
//! the [`CropSelector`] capability trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::AdjustmentState;
use crate::decode::{FilterType, Raster};
use crate::encode::{encode_png, EncodeError};
use crate::grid::GridStyle;
use crate::layout::CanvasSpec;
use crate::render::{render_composite_with, render_grid_only, RenderError};
use crate::transform::{apply_adjustments, crop, CropRect, TransformError};

/// Zoom applied to the crop widget once it is ready.
pub const INITIAL_CROP_ZOOM: f64 = 0.5;

/// Errors raised by session operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("No image has been loaded")]
    NoSource,

    #[error("No preview is available yet")]
    NoPreview,

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Issue-order tag for a recomputation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl From<u64> for Generation {
    fn from(value: u64) -> Self {
        Generation(value)
    }
}

/// The interactive crop widget, seen from the pipeline.
///
/// Implementations report their selection in the pixel space of the raster
/// they display, which is always the current transformed preview.
pub trait CropSelector {
    /// The current selection.
    fn selected_rect(&self) -> CropRect;

    /// Zoom the widget's view. Purely visual; does not move the selection.
    fn set_zoom(&mut self, factor: f64);
}

/// Source raster, adjustments, and the last good transformed preview.
#[derive(Debug, Default)]
pub struct PreviewSession {
    adjustments: AdjustmentState,
    source: Option<Raster>,
    preview: Option<Raster>,
    preview_generation: Option<Generation>,
    latest: Generation,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    pub fn source(&self) -> Option<&Raster> {
        self.source.as_ref()
    }

    /// The last successfully installed preview.
    pub fn preview(&self) -> Option<&Raster> {
        self.preview.as_ref()
    }

    /// Tag of the installed preview, if any.
    pub fn preview_generation(&self) -> Option<Generation> {
        self.preview_generation
    }

    /// The most recently issued tag.
    pub fn latest(&self) -> Generation {
        self.latest
    }

    /// Replace the source with a freshly decoded upload.
    ///
    /// Adjustments reset to their defaults and the old preview is dropped,
    /// since it shows a different image. Returns the tag for the first
    /// preview of the new source.
    pub fn load_source(&mut self, raster: Raster) -> Generation {
        tracing::debug!(
            width = raster.width,
            height = raster.height,
            "Loaded new source"
        );
        self.source = Some(raster);
        self.adjustments.reset();
        self.preview = None;
        self.preview_generation = None;
        self.request()
    }

    /// Store new adjustments (clamped) and issue a request for them.
    pub fn set_adjustments(&mut self, adjustments: AdjustmentState) -> Generation {
        self.adjustments = adjustments.normalized();
        self.request()
    }

    /// Issue a new tag. Any result for an earlier tag is now stale.
    pub fn request(&mut self) -> Generation {
        self.latest = self.latest.next();
        self.latest
    }

    pub fn is_current(&self, tag: Generation) -> bool {
        tag == self.latest
    }

    /// Install `raster` if `tag` is still the latest request.
    ///
    /// Returns `false` and discards the raster when a newer request has been
    /// issued since.
    pub fn complete(&mut self, tag: Generation, raster: Raster) -> bool {
        if !self.is_current(tag) {
            tracing::debug!(
                tag = tag.value(),
                latest = self.latest.value(),
                "Discarding stale preview"
            );
            return false;
        }
        self.preview = Some(raster);
        self.preview_generation = Some(tag);
        true
    }

    /// Record that the request for `tag` failed. The last good preview stays.
    pub fn fail(&self, tag: Generation, error: &dyn std::error::Error) {
        tracing::warn!(
            tag = tag.value(),
            stale = !self.is_current(tag),
            error = %error,
            "Preview request failed, keeping last good preview"
        );
    }

    /// Recompute the preview synchronously for the current adjustments.
    ///
    /// # Errors
    ///
    /// `SessionError::NoSource` before any upload; otherwise the transform
    /// error, with the previous preview left in place.
    pub fn render(&mut self) -> Result<&Raster, SessionError> {
        if self.source.is_none() {
            return Err(SessionError::NoSource);
        }
        let tag = self.request();
        let source = self.source.as_ref().ok_or(SessionError::NoSource)?;

        match apply_adjustments(source, &self.adjustments) {
            Ok(raster) => {
                self.complete(tag, raster);
            }
            Err(e) => {
                self.fail(tag, &e);
                return Err(e.into());
            }
        }
        self.preview.as_ref().ok_or(SessionError::NoPreview)
    }

    /// Zoom a freshly shown crop widget to its starting level.
    pub fn prepare_selector<S: CropSelector + ?Sized>(&self, selector: &mut S) {
        selector.set_zoom(INITIAL_CROP_ZOOM);
    }

    /// Crop the current preview to the widget's selection.
    pub fn crop_with<S: CropSelector + ?Sized>(&self, selector: &S) -> Result<Raster, SessionError> {
        let preview = self.preview.as_ref().ok_or(SessionError::NoPreview)?;
        let rect = selector.selected_rect();
        let cropped = crop(preview, rect)?;
        tracing::debug!(
            ?rect,
            width = cropped.width,
            height = cropped.height,
            "Cropped preview"
        );
        Ok(cropped)
    }
}

/// Canvas settings plus the accepted crop; renders and exports the grid.
#[derive(Debug, Clone, Default)]
pub struct GridSession {
    canvas: CanvasSpec,
    style: GridStyle,
    image: Option<Raster>,
}

impl GridSession {
    pub fn new(canvas: CanvasSpec, style: GridStyle) -> Self {
        Self {
            canvas,
            style,
            image: None,
        }
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    pub fn style(&self) -> &GridStyle {
        &self.style
    }

    pub fn image(&self) -> Option<&Raster> {
        self.image.as_ref()
    }

    pub fn set_canvas(&mut self, canvas: CanvasSpec) {
        self.canvas = canvas;
    }

    pub fn set_style(&mut self, style: GridStyle) {
        self.style = style;
    }

    pub fn set_image(&mut self, image: Raster) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Crop the preview through `selector` and keep the result as the image.
    pub fn accept_crop<S: CropSelector + ?Sized>(
        &mut self,
        preview: &PreviewSession,
        selector: &S,
    ) -> Result<&Raster, SessionError> {
        let cropped = preview.crop_with(selector)?;
        Ok(self.image.insert(cropped))
    }

    /// Selection matching the canvas shape, centred in `preview`.
    pub fn initial_crop(&self, preview: &Raster) -> Option<CropRect> {
        let aspect = self.canvas.aspect_ratio()?;
        CropRect::centered_with_aspect(preview.width, preview.height, aspect)
    }

    /// On-screen composite; the grid alone until an image is accepted.
    pub fn render(&self) -> Result<Raster, SessionError> {
        self.render_with(FilterType::Bilinear)
    }

    /// Full-quality composite as PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, SessionError> {
        let composite = self.render_with(FilterType::Lanczos3)?;
        Ok(encode_png(&composite)?)
    }

    fn render_with(&self, filter: FilterType) -> Result<Raster, SessionError> {
        let raster = match &self.image {
            Some(image) => render_composite_with(image, &self.canvas, &self.style, filter)?,
            None => render_grid_only(&self.canvas, &self.style)?,
        };
        Ok(raster)
    }
}
