//! Acquisition loading.
//!
//! Turns an acquisition directory into a lazy [`LabeledArray`] with dims
//! `(channel, time, region, field, y, x)`.
//!
//! ```text
//! <base>/raw_imgs/T<int>/<region>-<field>-<exposure>.tif
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ AcquisitionTags  │ ──▶ │  nested stacking │ ──▶ │  LabeledArray    │
//! │ (discover)       │     │  (TileReader)    │     │  (+ gap filling) │
//! └──────────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! [`load_experiment`] dispatches on [`ExperimentType`]. Only the `lux`
//! directory layout is implemented; the other formats are recognised and
//! rejected with [`AcquisitionError::UnsupportedFormat`].

mod lux;
mod tags;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::array::LabeledArray;
use crate::error::AcquisitionError;

pub use lux::{assemble, assemble_with, AssembleOptions, LuxLoader, ACQUISITION_DIMS};
pub use tags::{
    channel_name, field_label, parse_leaf_name, parse_timepoint, region_label, AcquisitionTags,
    RAW_IMAGES_DIR, TAG_DELIMITER, TILE_EXTENSION, TIMEPOINT_PREFIX,
};

// =============================================================================
// ExperimentType
// =============================================================================

/// Supported acquisition formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentType {
    Cq1,
    Nd2,
    Lux,
    Legacy,
    LegacyIcc,
}

impl ExperimentType {
    pub const ALL: [ExperimentType; 5] = [
        ExperimentType::Cq1,
        ExperimentType::Nd2,
        ExperimentType::Lux,
        ExperimentType::Legacy,
        ExperimentType::LegacyIcc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExperimentType::Cq1 => "cq1",
            ExperimentType::Nd2 => "nd2",
            ExperimentType::Lux => "lux",
            ExperimentType::Legacy => "legacy",
            ExperimentType::LegacyIcc => "legacy-icc",
        }
    }

    /// Loader for this format, if one is implemented.
    pub fn loader(&self, options: AssembleOptions) -> Option<Loader> {
        match self {
            ExperimentType::Lux => Some(Loader::Lux(LuxLoader::new(options))),
            _ => None,
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExperimentType {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AcquisitionError::UnsupportedFormat(s.to_string()))
    }
}

// =============================================================================
// Loaders
// =============================================================================

/// Loads one acquisition format into a labeled array.
pub trait AcquisitionLoader: Send + Sync {
    /// The format this loader reads.
    fn experiment_type(&self) -> ExperimentType;

    /// Load the acquisition rooted at `base`.
    fn load(&self, base: &Path) -> Result<LabeledArray, AcquisitionError>;
}

/// Enum dispatch over the implemented loaders.
#[derive(Debug, Clone)]
pub enum Loader {
    Lux(LuxLoader),
}

impl AcquisitionLoader for Loader {
    fn experiment_type(&self) -> ExperimentType {
        match self {
            Loader::Lux(loader) => loader.experiment_type(),
        }
    }

    fn load(&self, base: &Path) -> Result<LabeledArray, AcquisitionError> {
        match self {
            Loader::Lux(loader) => loader.load(base),
        }
    }
}

/// Load an acquisition of `kind` with default tile settings.
pub fn load_experiment(
    path: &Path,
    kind: ExperimentType,
    fill_missing: bool,
) -> Result<LabeledArray, AcquisitionError> {
    load_experiment_with(
        path,
        kind,
        &AssembleOptions {
            fill_missing,
            ..AssembleOptions::default()
        },
    )
}

/// Load an acquisition of `kind` with explicit options.
pub fn load_experiment_with(
    path: &Path,
    kind: ExperimentType,
    options: &AssembleOptions,
) -> Result<LabeledArray, AcquisitionError> {
    let loader = kind
        .loader(*options)
        .ok_or_else(|| AcquisitionError::UnsupportedFormat(kind.name().to_string()))?;
    loader.load(path)
}

// =============================================================================
// Tests
// =============================================================================
