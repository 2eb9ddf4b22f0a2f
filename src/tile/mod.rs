//! Lazy tile reading.
//!
//! This module turns single-plane image files into deferred planes of a fixed
//! shape.
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────────┐     ┌─────────────────────┐     ┌────────────────────┐
//! │  decode_plane │ ──▶ │  shape check        │ ──▶ │  f32 plane         │
//! │  (tiff/image) │     │  resize or mismatch │     │  or NaN on error   │
//! └───────────────┘     └─────────────────────┘     └────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileReader`]: expected shape plus mismatch policy; `read`, `load`, `lazy`
//! - [`make_reader`]: closure form of [`TileReader::lazy`]
//! - [`decode_plane`]: raw decoding of one grayscale plane
//! - [`resize_preserving_range`]: anti-aliased bilinear resampling
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use plate_assembler::tile::make_reader;
//!
//! let read = make_reader((2048, 2048), true);
//! let plane = read(Path::new("raw_imgs/T0/well_A1-mosaic_0-DAPI_100.tif"));
//!
//! // Nothing has been read yet.
//! let pixels = plane.compute();
//! assert_eq!(pixels.dim(), (2048, 2048));
//! ```

mod decode;
mod reader;
mod resize;

pub use decode::{decode_plane, is_tiff_path};
pub use reader::{make_reader, read_tiff_lazy, TileReader, DEFAULT_TILE_SHAPE, DEFAULT_TILE_SIZE};
pub use resize::resize_preserving_range;
