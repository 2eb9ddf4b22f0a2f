//! PNG encoding of rendered previews.

use std::fs;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::info;

use crate::error::RenderError;

/// Encode an RGB image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut output = Vec::new();
    PngEncoder::new(&mut output)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| RenderError::Encode {
            message: e.to_string(),
        })?;
    Ok(output)
}

/// Encode an RGB image as PNG and write it to `path`.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), RenderError> {
    let bytes = encode_png(image)?;
    fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        "Wrote {}x{} preview",
        image.width(),
        image.height()
    );
    Ok(())
}
