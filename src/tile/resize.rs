//! Range-preserving plane resampling.
//!
//! Downscaled axes are first smoothed with a Gaussian whose sigma grows with
//! the scale factor (`sigma = (scale - 1) / 2`), then every output pixel is
//! bilinearly interpolated at the matching input pixel centre. The result is
//! clipped to the input's value range, so no new extrema are introduced.

use ndarray::{Array2, ArrayView2, Axis};

use crate::array::{Plane, MISSING};

/// Gaussian kernels are truncated at this many standard deviations.
const TRUNCATE: f32 = 4.0;

/// Resize `plane` to `shape` with anti-aliasing, keeping its value range.
///
/// An empty input yields a plane of missing values.
pub fn resize_preserving_range(plane: ArrayView2<'_, f32>, shape: (usize, usize)) -> Plane {
    let (in_h, in_w) = plane.dim();
    let (out_h, out_w) = shape;

    if plane.dim() == shape {
        return plane.to_owned();
    }
    if in_h == 0 || in_w == 0 {
        return Array2::from_elem(shape, MISSING);
    }

    let scale_y = in_h as f32 / out_h.max(1) as f32;
    let scale_x = in_w as f32 / out_w.max(1) as f32;

    let mut smoothed = plane.to_owned();
    let sigma_y = ((scale_y - 1.0) / 2.0).max(0.0);
    let sigma_x = ((scale_x - 1.0) / 2.0).max(0.0);
    if sigma_y > 0.0 {
        smoothed = gaussian_along(smoothed.view(), Axis(0), sigma_y);
    }
    if sigma_x > 0.0 {
        smoothed = gaussian_along(smoothed.view(), Axis(1), sigma_x);
    }

    let (lo, hi) = value_range(plane);
    let rows: Vec<(usize, usize, f32)> = (0..out_h).map(|o| sample_at(o, scale_y, in_h)).collect();
    let cols: Vec<(usize, usize, f32)> = (0..out_w).map(|o| sample_at(o, scale_x, in_w)).collect();

    Array2::from_shape_fn(shape, |(oy, ox)| {
        let (y0, y1, wy) = rows[oy];
        let (x0, x1, wx) = cols[ox];
        let top = smoothed[[y0, x0]] * (1.0 - wx) + smoothed[[y0, x1]] * wx;
        let bottom = smoothed[[y1, x0]] * (1.0 - wx) + smoothed[[y1, x1]] * wx;
        let value = top * (1.0 - wy) + bottom * wy;
        if value.is_nan() {
            value
        } else {
            value.clamp(lo, hi)
        }
    })
}

/// Input neighbours and weight for output index `o` along one axis.
fn sample_at(o: usize, scale: f32, len: usize) -> (usize, usize, f32) {
    let centre = ((o as f32 + 0.5) * scale - 0.5).clamp(0.0, (len - 1) as f32);
    let lower = centre.floor() as usize;
    let upper = (lower + 1).min(len - 1);
    (lower, upper, centre - lower as f32)
}

/// Minimum and maximum over the non-NaN elements.
fn value_range(plane: ArrayView2<'_, f32>) -> (f32, f32) {
    plane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f32 / sigma).powi(2)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Reflect an out-of-range index about the edge samples (`d c b | a b c d | c b a`).
fn mirror(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = index.rem_euclid(period);
    if m >= len as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

fn gaussian_along(plane: ArrayView2<'_, f32>, axis: Axis, sigma: f32) -> Plane {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::zeros(plane.dim());

    for (src, mut dst) in plane.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let len = src.len();
        for i in 0..len {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let j = mirror(i as isize + k as isize - radius, len);
                acc += weight * src[j];
            }
            dst[i] = acc;
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
