//! N-dimensional arrays of deferred planes.

use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;

use crate::error::ArrayError;

use super::fill::FillDirection;
use super::plane::{FillLane, LaneCache, LazyPlane, Plane, PlaneFn};

// =============================================================================
// LazyArray
// =============================================================================

/// A lazily evaluated array whose last two axes are `(y, x)`.
///
/// The leading axes index a row-major list of [`LazyPlane`]s. Building,
/// stacking, selecting and filling only rearrange graph nodes; pixel data is
/// produced by [`LazyArray::compute`] or [`LazyArray::compute_plane`].
#[derive(Debug, Clone)]
pub struct LazyArray {
    shape: Vec<usize>,
    planes: Vec<LazyPlane>,
}

impl LazyArray {
    /// Wrap a single plane as a 2D array.
    pub fn from_plane(plane: LazyPlane) -> Self {
        let (height, width) = plane.shape();
        Self {
            shape: vec![height, width],
            planes: vec![plane],
        }
    }

    /// Build an array from planes listed in row-major order over `lead_shape`.
    pub fn from_planes(
        lead_shape: &[usize],
        plane_shape: (usize, usize),
        planes: Vec<LazyPlane>,
    ) -> Result<Self, ArrayError> {
        let expected: usize = lead_shape.iter().product();
        if planes.len() != expected {
            return Err(ArrayError::ShapeMismatch {
                expected: lead_shape.to_vec(),
                actual: vec![planes.len()],
            });
        }
        if let Some(bad) = planes.iter().find(|p| p.shape() != plane_shape) {
            return Err(ArrayError::ShapeMismatch {
                expected: vec![plane_shape.0, plane_shape.1],
                actual: vec![bad.shape().0, bad.shape().1],
            });
        }

        let mut shape = lead_shape.to_vec();
        shape.extend([plane_shape.0, plane_shape.1]);
        Ok(Self { shape, planes })
    }

    /// Stack arrays of identical shape along a new leading axis.
    ///
    /// Fails with [`ArrayError::EmptyStack`] when `parts` is empty; use
    /// [`LazyArray::stack_with_shape`] when the part shape is known up front.
    pub fn stack(parts: Vec<LazyArray>) -> Result<Self, ArrayError> {
        let part_shape = parts.first().ok_or(ArrayError::EmptyStack)?.shape.clone();
        Self::stack_with_shape(parts, &part_shape)
    }

    /// Stack arrays along a new leading axis, each of shape `part_shape`.
    ///
    /// An empty `parts` yields a zero-length leading axis.
    pub fn stack_with_shape(
        parts: Vec<LazyArray>,
        part_shape: &[usize],
    ) -> Result<Self, ArrayError> {
        if part_shape.len() < 2 {
            return Err(ArrayError::DimensionMismatch {
                expected: 2,
                actual: part_shape.len(),
            });
        }

        let mut shape = Vec::with_capacity(part_shape.len() + 1);
        shape.push(parts.len());
        shape.extend_from_slice(part_shape);

        let mut planes = Vec::with_capacity(parts.iter().map(|p| p.planes.len()).sum());
        for part in parts {
            if part.shape != part_shape {
                return Err(ArrayError::ShapeMismatch {
                    expected: part_shape.to_vec(),
                    actual: part.shape,
                });
            }
            planes.extend(part.planes);
        }

        Ok(Self { shape, planes })
    }

    /// Full shape, including the trailing `(y, x)` axes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Shape of the axes in front of `(y, x)`.
    pub fn lead_shape(&self) -> &[usize] {
        &self.shape[..self.shape.len() - 2]
    }

    /// `(height, width)` of every plane.
    pub fn plane_shape(&self) -> (usize, usize) {
        let n = self.shape.len();
        (self.shape[n - 2], self.shape[n - 1])
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Planes in row-major order over the leading axes.
    pub fn planes(&self) -> &[LazyPlane] {
        &self.planes
    }

    /// The plane at a leading-axis index.
    pub fn plane(&self, index: &[usize]) -> Result<&LazyPlane, ArrayError> {
        let flat = self.flat_index(index)?;
        Ok(&self.planes[flat])
    }

    /// Select one position along a leading axis, dropping that axis.
    pub fn select(&self, axis: usize, index: usize) -> Result<Self, ArrayError> {
        self.select_axes(&[(axis, index)])
    }

    /// Select one position along each of several leading axes at once,
    /// dropping those axes.
    pub fn select_axes(&self, selection: &[(usize, usize)]) -> Result<Self, ArrayError> {
        let lead = self.lead_shape();
        for (position, &(axis, index)) in selection.iter().enumerate() {
            self.check_axis(axis)?;
            if index >= lead[axis] {
                return Err(ArrayError::IndexOutOfBounds {
                    axis: axis.to_string(),
                    index,
                    len: lead[axis],
                });
            }
            if selection[..position].iter().any(|&(a, _)| a == axis) {
                return Err(ArrayError::UnsupportedAxis(format!(
                    "axis {} is selected more than once",
                    axis
                )));
            }
        }
        Ok(self.gather(selection))
    }

    /// Select without validation. Axes must be distinct leading axes and
    /// indices in bounds.
    ///
    /// Only the kept planes are visited.
    pub(crate) fn gather(&self, selection: &[(usize, usize)]) -> Self {
        let lead = self.lead_shape();
        let strides = strides(lead);
        let offset: usize = selection
            .iter()
            .map(|&(axis, index)| index * strides[axis])
            .sum();
        let kept: Vec<usize> = (0..lead.len())
            .filter(|axis| !selection.iter().any(|&(a, _)| a == *axis))
            .collect();

        let mut shape: Vec<usize> = kept.iter().map(|&axis| lead[axis]).collect();
        let count: usize = shape.iter().product();
        let planes = (0..count)
            .map(|n| {
                let mut rest = n;
                let mut flat = offset;
                for &axis in kept.iter().rev() {
                    flat += (rest % lead[axis]) * strides[axis];
                    rest /= lead[axis];
                }
                self.planes[flat].clone()
            })
            .collect();

        let (height, width) = self.plane_shape();
        shape.extend([height, width]);
        Self { shape, planes }
    }

    /// Leading-axis index of the plane at row-major position `flat`.
    pub fn lead_index(&self, flat: usize) -> Vec<usize> {
        let lead = self.lead_shape();
        let mut index = vec![0; lead.len()];
        let mut rest = flat;
        for axis in (0..lead.len()).rev() {
            if lead[axis] > 0 {
                index[axis] = rest % lead[axis];
                rest /= lead[axis];
            }
        }
        index
    }

    /// Defer applying `func` to every `(y, x)` plane.
    pub fn map_planes(&self, func: PlaneFn) -> Self {
        Self {
            shape: self.shape.clone(),
            planes: self
                .planes
                .iter()
                .map(|plane| plane.map(Arc::clone(&func)))
                .collect(),
        }
    }

    /// Propagate valid values forward along a leading axis.
    pub fn ffill(&self, axis: usize) -> Result<Self, ArrayError> {
        self.fill(axis, &[FillDirection::Forward])
    }

    /// Propagate valid values backward along a leading axis.
    pub fn bfill(&self, axis: usize) -> Result<Self, ArrayError> {
        self.fill(axis, &[FillDirection::Backward])
    }

    /// Forward fill then backward fill along a leading axis, in one lane pass.
    pub fn fill_missing(&self, axis: usize) -> Result<Self, ArrayError> {
        self.fill(axis, &[FillDirection::Forward, FillDirection::Backward])
    }

    fn fill(&self, axis: usize, directions: &[FillDirection]) -> Result<Self, ArrayError> {
        self.check_axis(axis)?;
        let lead = self.lead_shape();
        let stride = strides(lead)[axis];
        let len = lead[axis];
        let plane_shape = self.plane_shape();

        let mut planes = self.planes.clone();
        for start in 0..self.planes.len() {
            if (start / stride) % len != 0 {
                continue;
            }
            let members: Vec<usize> = (0..len).map(|j| start + j * stride).collect();
            let lane = Arc::new(FillLane::new(
                members.iter().map(|&i| self.planes[i].clone()).collect(),
                directions.to_vec(),
            ));
            for (position, &flat) in members.iter().enumerate() {
                planes[flat] = LazyPlane::from_lane(plane_shape, Arc::clone(&lane), position);
            }
        }

        Ok(Self {
            shape: self.shape.clone(),
            planes,
        })
    }

    /// Evaluate every plane on the rayon pool and assemble the dense array.
    ///
    /// Each fill lane is evaluated once for the call.
    pub fn compute(&self) -> Result<ArrayD<f32>, ArrayError> {
        let cache = LaneCache::new();
        let evaluated: Vec<Plane> = self
            .planes
            .par_iter()
            .map(|plane| plane.compute_in(&cache))
            .collect();

        let mut data = Vec::with_capacity(self.len());
        for plane in &evaluated {
            data.extend(plane.iter().copied());
        }

        let actual = data.len();
        ArrayD::from_shape_vec(IxDyn(&self.shape), data).map_err(|_| ArrayError::ShapeMismatch {
            expected: self.shape.clone(),
            actual: vec![actual],
        })
    }

    /// Evaluate every plane on the rayon pool and return the row-major
    /// positions of those matching `predicate`.
    ///
    /// Each plane is dropped once tested, and each fill lane once its last
    /// plane has been tested.
    pub fn find_planes<P>(&self, predicate: P) -> Vec<usize>
    where
        P: Fn(&Plane) -> bool + Send + Sync,
    {
        let cache = LaneCache::new();
        self.planes
            .par_iter()
            .enumerate()
            .filter_map(|(flat, plane)| predicate(&plane.compute_in(&cache)).then_some(flat))
            .collect()
    }

    /// Evaluate a single plane.
    pub fn compute_plane(&self, index: &[usize]) -> Result<Plane, ArrayError> {
        Ok(self.plane(index)?.compute())
    }

    fn check_axis(&self, axis: usize) -> Result<(), ArrayError> {
        let leading = self.lead_shape().len();
        if axis >= leading {
            return Err(ArrayError::AxisOutOfRange { axis, leading });
        }
        Ok(())
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize, ArrayError> {
        let lead = self.lead_shape();
        if index.len() != lead.len() {
            return Err(ArrayError::DimensionMismatch {
                expected: lead.len(),
                actual: index.len(),
            });
        }

        let mut flat = 0;
        for (axis, (&i, &len)) in index.iter().zip(lead).enumerate() {
            if i >= len {
                return Err(ArrayError::IndexOutOfBounds {
                    axis: axis.to_string(),
                    index: i,
                    len,
                });
            }
            flat = flat * len + i;
        }
        Ok(flat)
    }
}

/// Row-major strides, in planes, of the leading axes.
fn strides(lead: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; lead.len()];
    for axis in (0..lead.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * lead[axis + 1];
    }
    strides
}

// =============================================================================
// Tests
// =============================================================================
