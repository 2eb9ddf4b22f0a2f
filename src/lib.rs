//! # Plate Assembler
//!
//! Assembles microscopy plate-imaging acquisitions, stored as directories of
//! per-field TIFF images, into one lazily evaluated array labeled by channel,
//! time, region and field.
//!
//! ## Features
//!
//! - **Lazy reads**: Every tile is a deferred read; nothing is decoded until a plane is computed
//! - **Tag discovery**: Timepoints, regions, fields and exposures come from the directory layout
//! - **Gap filling**: Missing planes are filled from neighbouring timepoints, then fields
//! - **Parallel evaluation**: Planes are computed on a rayon thread pool
//! - **Previews**: Channels at one position can be composited into a PNG
//!
//! ## Architecture
//!
//! - [`tile`] - Lazy single-tile reader, decoding and resizing
//! - [`array`] - Lazy plane graph, N-d lazy arrays and labeled arrays
//! - [`acquisition`] - Tag discovery, assembly and format dispatch
//! - [`color`] - Channel display colours
//! - [`render`] - Composite previews and PNG encoding
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use plate_assembler::{assemble, CoordLabel, Dim};
//!
//! let plate = assemble(Path::new("/data/plate_01"), true)?;
//! println!("{:?} {:?}", plate.dims(), plate.shape());
//!
//! let dapi = plate.sel(&[
//!     (Dim::Channel, CoordLabel::from("DAPI")),
//!     (Dim::Time, CoordLabel::Int(0)),
//!     (Dim::Region, CoordLabel::from("B2")),
//!     (Dim::Field, CoordLabel::from("0")),
//! ])?;
//! let pixels = dapi.compute()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod acquisition;
pub mod array;
pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod tile;

// Re-export commonly used types
pub use acquisition::{
    assemble, assemble_with, load_experiment, load_experiment_with, AcquisitionLoader,
    AcquisitionTags, AssembleOptions, ExperimentType, LuxLoader,
};
pub use array::{
    ArraySummary, CoordLabel, CoordValues, Dim, LabeledArray, LazyArray, LazyPlane, Plane,
    Selection, MISSING,
};
pub use color::{get_float_color, hex_to_float_rgb};
pub use config::{Cli, Command};
pub use error::{AcquisitionError, ArrayError, ColorError, RenderError, TileError};
pub use render::{encode_png, write_png, CompositeRenderer};
pub use tile::{make_reader, read_tiff_lazy, TileReader};
