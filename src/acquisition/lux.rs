//! Assembly of `raw_imgs/T<int>/<region>-<field>-<exposure>.tif` acquisitions.

use std::path::Path;

use tracing::{info, warn};

use crate::array::{CoordValues, Dim, LabeledArray, LazyArray};
use crate::error::AcquisitionError;
use crate::tile::{TileReader, DEFAULT_TILE_SHAPE};

use super::tags::AcquisitionTags;
use super::{AcquisitionLoader, ExperimentType};

/// Dimension order of an assembled acquisition.
pub const ACQUISITION_DIMS: [Dim; 6] = [Dim::Channel, Dim::Time, Dim::Region, Dim::Field, Dim::Y, Dim::X];

// =============================================================================
// Options
// =============================================================================

/// Options for [`assemble_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Fill missing planes along time, then field
    pub fill_missing: bool,

    /// Expected `(height, width)` of every tile
    pub tile_shape: (usize, usize),

    /// Resize tiles of another shape instead of treating them as missing
    pub reshape: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            fill_missing: false,
            tile_shape: DEFAULT_TILE_SHAPE,
            reshape: true,
        }
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Assemble the acquisition under `base` with default tile settings.
pub fn assemble(base: &Path, fill_missing: bool) -> Result<LabeledArray, AcquisitionError> {
    assemble_with(
        base,
        &AssembleOptions {
            fill_missing,
            ..AssembleOptions::default()
        },
    )
}

/// Assemble the acquisition under `base` into a lazy
/// `(channel, time, region, field, y, x)` array.
///
/// Every combination of discovered tags gets one deferred tile read. Tiles
/// that are absent or unreadable evaluate to missing values; axes are never
/// shortened by them. With `fill_missing`, missing values are filled forward
/// then backward along `time`, then along `field`.
pub fn assemble_with(
    base: &Path,
    options: &AssembleOptions,
) -> Result<LabeledArray, AcquisitionError> {
    let tags = AcquisitionTags::discover(base)?;
    info!(
        base = %base.display(),
        "Discovered {} exposure(s), {} timepoint(s), {} region(s), {} field(s)",
        tags.exposures.len(),
        tags.timepoints.len(),
        tags.regions.len(),
        tags.fields.len()
    );
    if tags.is_degenerate() {
        warn!(
            base = %base.display(),
            "No complete set of tags found, the acquisition has a zero-length axis"
        );
    }

    let reader = TileReader::new(options.tile_shape, options.reshape);
    let (height, width) = options.tile_shape;
    let plane_shape = [height, width];
    let field_shape = [tags.fields.len(), height, width];
    let region_shape = [tags.regions.len(), tags.fields.len(), height, width];
    let time_shape = [
        tags.timepoints.len(),
        tags.regions.len(),
        tags.fields.len(),
        height,
        width,
    ];

    // Outer to inner: exposure, timepoint, region, field. The first stacked
    // axis belongs to the outermost loop.
    let mut channels = Vec::with_capacity(tags.exposures.len());
    for exposure in &tags.exposures {
        let mut timepoints = Vec::with_capacity(tags.timepoints.len());
        for &timepoint in &tags.timepoints {
            let mut regions = Vec::with_capacity(tags.regions.len());
            for region in &tags.regions {
                let fields = tags
                    .fields
                    .iter()
                    .map(|field| {
                        let path =
                            AcquisitionTags::leaf_path(base, timepoint, region, field, exposure);
                        LazyArray::from_plane(reader.lazy(path))
                    })
                    .collect();
                regions.push(LazyArray::stack_with_shape(fields, &plane_shape)?);
            }
            timepoints.push(LazyArray::stack_with_shape(regions, &field_shape)?);
        }
        channels.push(LazyArray::stack_with_shape(timepoints, &region_shape)?);
    }
    let plate = LazyArray::stack_with_shape(channels, &time_shape)?;

    let mut intensity = LabeledArray::new(
        plate,
        ACQUISITION_DIMS.to_vec(),
        vec![
            (Dim::Channel, CoordValues::Str(tags.channel_coords())),
            (Dim::Time, CoordValues::Int(tags.timepoints.clone())),
            (Dim::Region, CoordValues::Str(tags.region_coords())),
            (Dim::Field, CoordValues::Str(tags.field_coords())),
        ],
    )?;

    if options.fill_missing {
        intensity = intensity
            .fill_missing(Dim::Time)?
            .fill_missing(Dim::Field)?;
    }

    Ok(intensity)
}

// =============================================================================
// Loader
// =============================================================================

/// [`AcquisitionLoader`] for the `raw_imgs` directory layout.
#[derive(Debug, Clone, Default)]
pub struct LuxLoader {
    options: AssembleOptions,
}

impl LuxLoader {
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }
}

impl AcquisitionLoader for LuxLoader {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::Lux
    }

    fn load(&self, base: &Path) -> Result<LabeledArray, AcquisitionError> {
        assemble_with(base, &self.options)
    }
}

// =============================================================================
// Tests
// =============================================================================
