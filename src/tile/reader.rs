//! Lazy single-tile reader.
//!
//! A [`TileReader`] turns a path into a deferred [`LazyPlane`]. Evaluation
//! decodes the file, coerces it to the expected shape and converts it to
//! `f32`. Any failure is logged and replaced with a plane of missing values,
//! so callers assembling many tiles never observe a per-tile error.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{debug, warn};

use crate::array::{LazyPlane, Plane, MISSING};
use crate::error::TileError;

use super::decode::decode_plane;
use super::resize::resize_preserving_range;

/// Default expected tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: usize = 2048;

/// Default expected `(height, width)` of a tile.
pub const DEFAULT_TILE_SHAPE: (usize, usize) = (DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE);

// =============================================================================
// TileReader
// =============================================================================

/// Reads single-plane images at a fixed expected shape.
///
/// The reader is stateless and can be shared across threads; deferred reads
/// built from it may be evaluated in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileReader {
    shape: (usize, usize),
    reshape: bool,
}

impl TileReader {
    /// Create a reader for tiles of `shape`.
    ///
    /// With `reshape` set, tiles of any other shape are resized; otherwise
    /// they fail with [`TileError::ShapeMismatch`].
    pub fn new(shape: (usize, usize), reshape: bool) -> Self {
        Self { shape, reshape }
    }

    /// Expected `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Whether mismatched tiles are resized.
    pub fn reshape(&self) -> bool {
        self.reshape
    }

    /// Read a tile, propagating errors.
    pub fn read(&self, path: &Path) -> Result<Plane, TileError> {
        debug!("Reading {}", path.display());
        let plane = decode_plane(path)?;

        if plane.dim() == self.shape {
            return Ok(plane);
        }
        if !self.reshape {
            return Err(TileError::ShapeMismatch {
                expected: self.shape,
                actual: plane.dim(),
            });
        }
        Ok(resize_preserving_range(plane.view(), self.shape))
    }

    /// Read a tile, substituting a plane of missing values on any error.
    pub fn load(&self, path: &Path) -> Plane {
        match self.read(path) {
            Ok(plane) => plane,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "Error reading tile: {}. This field will be filled based on surrounding fields and timepoints",
                    e
                );
                Array2::from_elem(self.shape, MISSING)
            }
        }
    }

    /// Defer [`TileReader::load`] until the plane is evaluated.
    pub fn lazy(&self, path: impl Into<PathBuf>) -> LazyPlane {
        let reader = *self;
        let path = path.into();
        LazyPlane::from_fn(self.shape, move || reader.load(&path))
    }
}

impl Default for TileReader {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SHAPE, true)
    }
}

// =============================================================================
// Convenience Constructors
// =============================================================================

/// Build a function mapping a path to a deferred tile of `shape`.
pub fn make_reader(
    shape: (usize, usize),
    reshape: bool,
) -> impl Fn(&Path) -> LazyPlane + Clone + Send + Sync {
    let reader = TileReader::new(shape, reshape);
    move |path: &Path| reader.lazy(path)
}

/// Deferred read of a default-shaped tile, resizing on mismatch.
pub fn read_tiff_lazy(path: &Path) -> LazyPlane {
    TileReader::default().lazy(path)
}

// =============================================================================
// Tests
// =============================================================================
