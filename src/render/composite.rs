//! Channel compositing.

use image::{Rgb, RgbImage};
use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

use crate::array::{CoordLabel, CoordValues, Dim, LabeledArray};
use crate::color::get_float_color;
use crate::error::RenderError;

// =============================================================================
// CompositeRenderer
// =============================================================================

/// Renders a `(channel, y, x)` array as one RGB image.
///
/// Each channel is tinted with its display colour and the tinted channels are
/// summed. Missing values render black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeRenderer {
    normalize: bool,
}

impl CompositeRenderer {
    /// With `normalize`, each channel is min-max scaled over its valid pixels
    /// before tinting. Without it, values are taken to be in `[0, 1]` already.
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Select one position of a larger array, then render it.
    ///
    /// `selection` must leave exactly `(channel, y, x)`.
    pub fn render_at(
        &self,
        array: &LabeledArray,
        selection: &[(Dim, CoordLabel)],
    ) -> Result<RgbImage, RenderError> {
        self.render(&array.sel(selection)?)
    }

    /// Render an array with dims `(channel, y, x)`.
    pub fn render(&self, array: &LabeledArray) -> Result<RgbImage, RenderError> {
        if array.dims() != [Dim::Channel, Dim::Y, Dim::X] {
            return Err(RenderError::InvalidLayout(format!(
                "expected dims (channel, y, x), got ({})",
                array
                    .dims()
                    .iter()
                    .map(Dim::name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        let channels = match array.coords(Dim::Channel) {
            Some(CoordValues::Str(names)) => names,
            _ => {
                return Err(RenderError::InvalidLayout(
                    "channel coordinates must be names".to_string(),
                ))
            }
        };

        // Resolve every colour before evaluating any plane.
        let colors = channels
            .iter()
            .map(|name| get_float_color(name))
            .collect::<Result<Vec<_>, _>>()?;

        let data = array.compute()?;
        let (height, width) = (data.shape()[1], data.shape()[2]);
        debug!(
            channels = channels.len(),
            "Compositing {}x{} preview",
            width,
            height
        );

        let mut accum = [
            Array2::<f32>::zeros((height, width)),
            Array2::<f32>::zeros((height, width)),
            Array2::<f32>::zeros((height, width)),
        ];
        for (plane, color) in data.axis_iter(Axis(0)).zip(&colors) {
            let plane = plane
                .into_dimensionality::<ndarray::Ix2>()
                .map_err(|e| RenderError::InvalidLayout(e.to_string()))?;
            let scaled = if self.normalize {
                normalize_plane(plane)
            } else {
                plane.mapv(|v| if v.is_nan() { 0.0 } else { v })
            };
            for (target, weight) in accum.iter_mut().zip(color) {
                target.scaled_add(*weight, &scaled);
            }
        }

        Ok(RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let at = [y as usize, x as usize];
            let [r, g, b] = &accum;
            Rgb([to_u8(r[at]), to_u8(g[at]), to_u8(b[at])])
        }))
    }
}

impl Default for CompositeRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Min-max scale over the non-NaN pixels. Constant planes become zero and
/// NaN pixels become zero.
pub fn normalize_plane(plane: ArrayView2<'_, f32>) -> Array2<f32> {
    let (lo, hi) = plane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;

    plane.mapv(|v| {
        if v.is_nan() || !(range > 0.0) {
            0.0
        } else {
            (v - lo) / range
        }
    })
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// =============================================================================
// Tests
// =============================================================================
