//! Drawing-surface allocation limits.
//!
//! Every stage that produces a raster checks its output size here first, so
//! an oversized or degenerate request fails with [`SurfaceError`] instead of
//! aborting on allocation.

use thiserror::Error;

/// Largest accepted edge length in pixels.
pub const MAX_SURFACE_EDGE: u32 = 32_767;

/// Largest accepted surface area in pixels.
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// A drawing surface of the requested size cannot be allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Cannot allocate a {width}x{height} drawing surface")]
pub struct SurfaceError {
    pub width: u32,
    pub height: u32,
}

/// Check that a `width x height` RGB surface can be allocated.
///
/// Returns the buffer length in bytes.
pub fn check_surface(width: u32, height: u32) -> Result<usize, SurfaceError> {
    let err = SurfaceError { width, height };
    if width == 0 || height == 0 || width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
        return Err(err);
    }
    let area = u64::from(width) * u64::from(height);
    if area > MAX_SURFACE_AREA {
        return Err(err);
    }
    usize::try_from(area * 3).map_err(|_| err)
}
