//! Single-plane image decoding.
//!
//! TIFF files are decoded with the `tiff` crate so that every integer and
//! floating point sample format keeps its raw values. Other extensions go
//! through the `image` crate and are limited to 8/16-bit grayscale.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use image::{DynamicImage, ImageReader};
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;

use crate::array::Plane;
use crate::error::TileError;

/// Decode the single grayscale plane stored at `path`.
///
/// # Errors
///
/// - [`TileError::MissingFile`] if nothing exists at `path`
/// - [`TileError::UnsupportedLayout`] for multi-sample (e.g. RGB) images
/// - [`TileError::Decode`] if the file is not a readable image
pub fn decode_plane(path: &Path) -> Result<Plane, TileError> {
    if is_tiff_path(path) {
        decode_tiff(path)
    } else {
        decode_with_image(path)
    }
}

/// Whether `path` has a `.tif` or `.tiff` extension.
pub fn is_tiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

fn decode_tiff(path: &Path) -> Result<Plane, TileError> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(decode_error)?;

    let (width, height) = decoder.dimensions().map_err(decode_error)?;
    match decoder.colortype().map_err(decode_error)? {
        ColorType::Gray(_) => {}
        other => return Err(TileError::UnsupportedLayout(format!("{:?}", other))),
    }

    let samples: Vec<f32> = match decoder.read_image().map_err(decode_error)? {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
    };

    plane_from_samples(samples, height, width)
}

fn decode_with_image(path: &Path) -> Result<Plane, TileError> {
    let reader = ImageReader::open(path)
        .map_err(|e| open_error(path, e))?
        .with_guessed_format()?;
    let img = reader.decode().map_err(decode_error)?;

    let (width, height) = (img.width(), img.height());
    let samples: Vec<f32> = match img {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        other => {
            return Err(TileError::UnsupportedLayout(format!("{:?}", other.color())));
        }
    };

    plane_from_samples(samples, height, width)
}

fn plane_from_samples(samples: Vec<f32>, height: u32, width: u32) -> Result<Plane, TileError> {
    Array2::from_shape_vec((height as usize, width as usize), samples).map_err(|e| {
        TileError::Decode {
            message: format!("sample count does not match {}x{}: {}", height, width, e),
        }
    })
}

fn open_error(path: &Path, err: io::Error) -> TileError {
    if err.kind() == io::ErrorKind::NotFound {
        TileError::MissingFile(path.to_path_buf())
    } else {
        TileError::Io(err)
    }
}

fn decode_error(err: impl std::fmt::Display) -> TileError {
    TileError::Decode {
        message: err.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
