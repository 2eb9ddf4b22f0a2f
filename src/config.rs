//! Command-line configuration for the plate assembler.
//!
//! Every option can also be set through an environment variable with the
//! `PLATE_` prefix:
//!
//! - `PLATE_PATH` - Acquisition root directory (required)
//! - `PLATE_EXPERIMENT_TYPE` - Acquisition format (default: lux)
//! - `PLATE_FILLNA` - Fill missing planes along time, then field (default: false)
//! - `PLATE_TILE_HEIGHT` / `PLATE_TILE_WIDTH` - Expected tile shape (default: 2048)
//! - `PLATE_NO_RESHAPE` - Treat tiles of another shape as missing (default: false)
//! - `PLATE_THREADS` - Worker threads for evaluation (default: one per core)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use plate_assembler::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! if let Command::Inspect(config) = cli.command {
//!     println!("Inspecting {}", config.acquisition.path.display());
//! }
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::acquisition::{AssembleOptions, ExperimentType};
use crate::tile::DEFAULT_TILE_SIZE;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Plate assembler - lazy labeled arrays from plate-imaging acquisitions.
#[derive(Parser, Debug, Clone)]
#[command(name = "plate-assembler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Number of worker threads used to evaluate planes.
    ///
    /// Defaults to one per available core.
    #[arg(long, global = true, env = "PLATE_THREADS")]
    pub threads: Option<usize>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Validate the global options and the selected subcommand.
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == Some(0) {
            return Err("threads must be greater than 0".to_string());
        }
        match &self.command {
            Command::Inspect(config) => config.validate(),
            Command::Render(config) => config.validate(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the dims, shape and coordinates of an acquisition.
    Inspect(InspectConfig),

    /// Render the channels at one position as a PNG preview.
    Render(RenderConfig),
}

// =============================================================================
// Acquisition Options
// =============================================================================

/// Options shared by every subcommand that loads an acquisition.
#[derive(Args, Debug, Clone)]
pub struct AcquisitionArgs {
    /// Acquisition root directory (the parent of `raw_imgs`).
    #[arg(long, env = "PLATE_PATH")]
    pub path: PathBuf,

    /// Acquisition format.
    #[arg(long, value_enum, default_value_t = ExperimentType::Lux, env = "PLATE_EXPERIMENT_TYPE")]
    pub experiment_type: ExperimentType,

    /// Fill missing planes from neighbouring timepoints, then fields.
    #[arg(long, default_value_t = false, env = "PLATE_FILLNA")]
    pub fillna: bool,

    /// Expected tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "PLATE_TILE_HEIGHT")]
    pub tile_height: usize,

    /// Expected tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "PLATE_TILE_WIDTH")]
    pub tile_width: usize,

    /// Treat tiles of another shape as missing instead of resizing them.
    #[arg(long, default_value_t = false, env = "PLATE_NO_RESHAPE")]
    pub no_reshape: bool,
}

impl AcquisitionArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_height == 0 || self.tile_width == 0 {
            return Err("tile_height and tile_width must be greater than 0".to_string());
        }
        if !self.path.is_dir() {
            return Err(format!(
                "Acquisition directory {} does not exist. Set --path or PLATE_PATH",
                self.path.display()
            ));
        }
        Ok(())
    }

    /// Assembly options for the library.
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            fill_missing: self.fillna,
            tile_shape: (self.tile_height, self.tile_width),
            reshape: !self.no_reshape,
        }
    }
}

// =============================================================================
// Inspect Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    #[command(flatten)]
    pub acquisition: AcquisitionArgs,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Evaluate every plane and report the ones with no valid pixel.
    #[arg(long, default_value_t = false)]
    pub check_missing: bool,
}

impl InspectConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.acquisition.validate()
    }
}

// =============================================================================
// Render Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    #[command(flatten)]
    pub acquisition: AcquisitionArgs,

    /// Timepoint to render.
    #[arg(long)]
    pub time: i64,

    /// Region label (without the `well_` prefix).
    #[arg(long)]
    pub region: String,

    /// Field label (without the `mosaic_` prefix).
    #[arg(long)]
    pub field: String,

    /// Output PNG path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Use raw intensities instead of per-channel min-max scaling.
    #[arg(long, default_value_t = false)]
    pub no_normalize: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.acquisition.validate()?;
        if self.region.is_empty() || self.field.is_empty() {
            return Err("region and field must not be empty".to_string());
        }
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(format!(
                    "Output directory {} does not exist",
                    parent.display()
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
