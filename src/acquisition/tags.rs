//! Acquisition tag discovery from the on-disk naming convention.
//!
//! Layout:
//!
//! ```text
//! <base>/raw_imgs/T<int>/<region>-<field>-<exposure>.tif
//! ```
//!
//! Timepoints come from directory names, the other three axes from the file
//! stem split on `-`. Every axis is deduplicated and sorted because the
//! position of a tag in its list becomes its array index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::error::AcquisitionError;

/// Directory under the acquisition root holding the per-timepoint folders.
pub const RAW_IMAGES_DIR: &str = "raw_imgs";

/// Leading letter of a timepoint directory name.
pub const TIMEPOINT_PREFIX: char = 'T';

/// Separator between the region, field and exposure tokens of a file name.
pub const TAG_DELIMITER: char = '-';

/// Extension of leaf tile files.
pub const TILE_EXTENSION: &str = "tif";

const REGION_PREFIX: &str = "well_";
const FIELD_PREFIX: &str = "mosaic_";
const CHANNEL_DELIMITER: char = '_';

// =============================================================================
// AcquisitionTags
// =============================================================================

/// The sorted, distinct tags found along each acquisition axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionTags {
    /// Timepoints in numeric order
    pub timepoints: Vec<i64>,

    /// Raw region tags (e.g. `well_B2`) in lexicographic order
    pub regions: Vec<String>,

    /// Raw field tags (e.g. `mosaic_0`) in lexicographic order
    pub fields: Vec<String>,

    /// Raw exposure tags (e.g. `DAPI_100`) in lexicographic order
    pub exposures: Vec<String>,
}

impl AcquisitionTags {
    /// Scan `base` for timepoint directories and leaf tiles.
    ///
    /// Entries that do not follow the naming convention are skipped with a
    /// warning. A missing `raw_imgs` directory yields empty tag lists.
    pub fn discover(base: &Path) -> Result<Self, AcquisitionError> {
        let root = Pattern::escape(&base.join(RAW_IMAGES_DIR).to_string_lossy());
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        let mut timepoints = BTreeSet::new();
        for entry in glob_with(&format!("{}/*", root), options)? {
            let path = entry.map_err(std::io::Error::from)?;
            if !path.is_dir() {
                debug!("Skipping non-directory entry {}", path.display());
                continue;
            }
            match file_name(&path).and_then(parse_timepoint) {
                Some(timepoint) => {
                    timepoints.insert(timepoint);
                }
                None => warn!(
                    path = %path.display(),
                    "Skipping directory that is not named T<int>"
                ),
            }
        }

        let mut regions = BTreeSet::new();
        let mut fields = BTreeSet::new();
        let mut exposures = BTreeSet::new();
        for entry in glob_with(&format!("{}/*/*.{}", root, TILE_EXTENSION), options)? {
            let path = entry.map_err(std::io::Error::from)?;
            match file_name(&path).and_then(parse_leaf_name) {
                Some((region, field, exposure)) => {
                    regions.insert(region.to_string());
                    fields.insert(field.to_string());
                    exposures.insert(exposure.to_string());
                }
                None => warn!(
                    path = %path.display(),
                    "Skipping tile whose name does not split into region-field-exposure"
                ),
            }
        }

        Ok(Self {
            timepoints: timepoints.into_iter().collect(),
            regions: regions.into_iter().collect(),
            fields: fields.into_iter().collect(),
            exposures: exposures.into_iter().collect(),
        })
    }

    /// Path of the leaf tile for one tag combination.
    pub fn leaf_path(
        base: &Path,
        timepoint: i64,
        region: &str,
        field: &str,
        exposure: &str,
    ) -> PathBuf {
        base.join(RAW_IMAGES_DIR)
            .join(format!("{}{}", TIMEPOINT_PREFIX, timepoint))
            .join(format!(
                "{region}{d}{field}{d}{exposure}.{ext}",
                d = TAG_DELIMITER,
                ext = TILE_EXTENSION
            ))
    }

    /// Whether no tile was found along at least one axis.
    pub fn is_degenerate(&self) -> bool {
        self.timepoints.is_empty()
            || self.regions.is_empty()
            || self.fields.is_empty()
            || self.exposures.is_empty()
    }

    /// Channel names, one per exposure.
    pub fn channel_coords(&self) -> Vec<String> {
        self.exposures.iter().map(|e| channel_name(e).to_string()).collect()
    }

    /// Region labels without the `well_` prefix.
    pub fn region_coords(&self) -> Vec<String> {
        self.regions.iter().map(|r| region_label(r).to_string()).collect()
    }

    /// Field labels without the `mosaic_` prefix.
    pub fn field_coords(&self) -> Vec<String> {
        self.fields.iter().map(|f| field_label(f).to_string()).collect()
    }
}

// =============================================================================
// Name Parsing
// =============================================================================

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Parse a `T<int>` directory name.
pub fn parse_timepoint(name: &str) -> Option<i64> {
    name.strip_prefix(TIMEPOINT_PREFIX)?.parse().ok()
}

/// Split a leaf file name into `(region, field, exposure)`.
///
/// Everything from the first `.` on is ignored. Returns `None` unless the
/// stem has exactly three `-`-separated tokens.
pub fn parse_leaf_name(name: &str) -> Option<(&str, &str, &str)> {
    let stem = name.split('.').next()?;
    let mut tokens = stem.split(TAG_DELIMITER);
    let region = tokens.next()?;
    let field = tokens.next()?;
    let exposure = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((region, field, exposure))
}

/// Channel name of an exposure tag: the text before the first `_`.
pub fn channel_name(exposure: &str) -> &str {
    exposure.split(CHANNEL_DELIMITER).next().unwrap_or(exposure)
}

/// Region label with the `well_` prefix stripped.
pub fn region_label(region: &str) -> &str {
    region.strip_prefix(REGION_PREFIX).unwrap_or(region)
}

/// Field label with the `mosaic_` prefix stripped.
pub fn field_label(field: &str) -> &str {
    field.strip_prefix(FIELD_PREFIX).unwrap_or(field)
}

// =============================================================================
// Tests
// =============================================================================
