//! Test utilities for integration tests.
//!
//! Helpers that write synthetic acquisitions, laid out as
//! `raw_imgs/T<int>/<region>-<field>-<exposure>.tif`, into temporary
//! directories.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};

use plate_assembler::acquisition::AcquisitionTags;

// =============================================================================
// TIFF Writers
// =============================================================================

/// Write a constant 16-bit grayscale TIFF.
pub fn write_gray16(path: &Path, width: u32, height: u32, value: u16) {
    let data = vec![value; (width * height) as usize];
    write_gray16_data(path, width, height, &data);
}

/// Write a 16-bit grayscale TIFF from row-major pixel data.
pub fn write_gray16_data(path: &Path, width: u32, height: u32, data: &[u16]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::Gray16>(width, height, data)
        .unwrap();
}

/// Write a 32-bit float grayscale TIFF.
pub fn write_gray32f(path: &Path, width: u32, height: u32, data: &[f32]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(width, height, data)
        .unwrap();
}

/// Write an 8-bit RGB TIFF.
pub fn write_rgb8(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let data = vec![128u8; (width * height * 3) as usize];
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::RGB8>(width, height, &data)
        .unwrap();
}

// =============================================================================
// Acquisition Builder
// =============================================================================

/// A synthetic acquisition in a temporary directory.
///
/// Tiles are square with edge `size` and constant value.
pub struct AcquisitionBuilder {
    dir: TempDir,
    size: u32,
}

impl AcquisitionBuilder {
    pub fn new(size: u32) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            size,
        }
    }

    /// Acquisition root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the leaf tile for a tag combination.
    pub fn leaf(&self, timepoint: i64, region: &str, field: &str, exposure: &str) -> PathBuf {
        AcquisitionTags::leaf_path(self.path(), timepoint, region, field, exposure)
    }

    /// Write one constant tile.
    pub fn tile(
        self,
        timepoint: i64,
        region: &str,
        field: &str,
        exposure: &str,
        value: u16,
    ) -> Self {
        let path = self.leaf(timepoint, region, field, exposure);
        write_gray16(&path, self.size, self.size, value);
        self
    }

    /// Write one tile of another size.
    pub fn tile_sized(
        self,
        timepoint: i64,
        region: &str,
        field: &str,
        exposure: &str,
        size: u32,
        value: u16,
    ) -> Self {
        let path = self.leaf(timepoint, region, field, exposure);
        write_gray16(&path, size, size, value);
        self
    }

    /// Write a file that is named like a tile but is not a TIFF.
    pub fn corrupt_tile(self, timepoint: i64, region: &str, field: &str, exposure: &str) -> Self {
        let path = self.leaf(timepoint, region, field, exposure);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not a tiff").unwrap();
        self
    }

    /// Create an empty timepoint directory.
    pub fn timepoint(self, timepoint: i64) -> Self {
        fs::create_dir_all(self.path().join("raw_imgs").join(format!("T{}", timepoint))).unwrap();
        self
    }

    /// Write every combination of the given tags with value `value_of(t, r, f, e)`.
    pub fn grid(
        mut self,
        timepoints: &[i64],
        regions: &[&str],
        fields: &[&str],
        exposures: &[&str],
        value_of: impl Fn(usize, usize, usize, usize) -> u16,
    ) -> Self {
        for (e, exposure) in exposures.iter().enumerate() {
            for (t, &timepoint) in timepoints.iter().enumerate() {
                for (r, region) in regions.iter().enumerate() {
                    for (f, field) in fields.iter().enumerate() {
                        self = self.tile(timepoint, region, field, exposure, value_of(t, r, f, e));
                    }
                }
            }
        }
        self
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Whether every element of a plane is NaN.
pub fn is_missing(plane: &ndarray::Array2<f32>) -> bool {
    plane.iter().all(|v| v.is_nan())
}

/// Whether every element of a plane equals `value`.
pub fn is_constant(plane: &ndarray::Array2<f32>, value: f32) -> bool {
    plane.iter().all(|&v| v == value)
}
