//! Arrays with named dimensions and coordinate labels.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::ArrayD;
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ArrayError;

use super::lazy::LazyArray;
use super::plane::PlaneFn;

// =============================================================================
// Dimensions and Coordinates
// =============================================================================

/// Semantic axis of an acquisition array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dim {
    Channel,
    Time,
    Region,
    Field,
    Y,
    X,
}

impl Dim {
    /// Lowercase axis name.
    pub const fn name(&self) -> &'static str {
        match self {
            Dim::Channel => "channel",
            Dim::Time => "time",
            Dim::Region => "region",
            Dim::Field => "field",
            Dim::Y => "y",
            Dim::X => "x",
        }
    }

    /// Whether this is one of the trailing `(y, x)` plane axes.
    pub const fn is_plane_axis(&self) -> bool {
        matches!(self, Dim::Y | Dim::X)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single coordinate label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CoordLabel {
    Int(i64),
    Str(String),
}

impl fmt::Display for CoordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordLabel::Int(v) => write!(f, "{}", v),
            CoordLabel::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CoordLabel {
    fn from(value: i64) -> Self {
        CoordLabel::Int(value)
    }
}

impl From<&str> for CoordLabel {
    fn from(value: &str) -> Self {
        CoordLabel::Str(value.to_string())
    }
}

impl From<String> for CoordLabel {
    fn from(value: String) -> Self {
        CoordLabel::Str(value)
    }
}

/// The labels along one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoordValues {
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Int(v) => v.len(),
            CoordValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label at position `index`.
    pub fn get(&self, index: usize) -> Option<CoordLabel> {
        match self {
            CoordValues::Int(v) => v.get(index).map(|&x| CoordLabel::Int(x)),
            CoordValues::Str(v) => v.get(index).map(|s| CoordLabel::Str(s.clone())),
        }
    }

    /// Position of the first occurrence of `label`.
    pub fn position(&self, label: &CoordLabel) -> Option<usize> {
        match (self, label) {
            (CoordValues::Int(v), CoordLabel::Int(x)) => v.iter().position(|y| y == x),
            (CoordValues::Str(v), CoordLabel::Str(s)) => v.iter().position(|y| y == s),
            _ => None,
        }
    }
}

// =============================================================================
// LabeledArray
// =============================================================================

/// One entry produced by [`LabeledArray::iter_selections`].
#[derive(Debug, Clone)]
pub struct Selection {
    /// The coordinate labels that were selected, in dimension order
    pub labels: Vec<(Dim, CoordLabel)>,

    /// The sub-array left after the selection
    pub array: LabeledArray,
}

/// Serialisable description of a labeled array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySummary {
    pub dims: Vec<Dim>,
    pub shape: Vec<usize>,
    pub coords: BTreeMap<Dim, CoordValues>,
}

/// A [`LazyArray`] with named dimensions and per-axis coordinate labels.
///
/// Every operation returns a new value; the underlying planes are shared.
#[derive(Debug, Clone)]
pub struct LabeledArray {
    data: LazyArray,
    dims: Vec<Dim>,
    coords: BTreeMap<Dim, CoordValues>,
}

impl LabeledArray {
    /// Attach dimension names and coordinates to an array.
    ///
    /// `dims` must name every axis once and end with `(y, x)`. Each
    /// coordinate list must match the length of its axis.
    pub fn new(
        data: LazyArray,
        dims: Vec<Dim>,
        coords: Vec<(Dim, CoordValues)>,
    ) -> Result<Self, ArrayError> {
        if dims.len() != data.ndim() {
            return Err(ArrayError::DimensionMismatch {
                expected: data.ndim(),
                actual: dims.len(),
            });
        }
        if dims[dims.len() - 2..] != [Dim::Y, Dim::X] {
            return Err(ArrayError::UnsupportedAxis(
                "the last two dimensions must be (y, x)".to_string(),
            ));
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) || (dim.is_plane_axis() && i < dims.len() - 2) {
                return Err(ArrayError::UnsupportedAxis(format!(
                    "dimension {} appears more than once",
                    dim
                )));
            }
        }

        let mut map = BTreeMap::new();
        for (dim, values) in coords {
            let axis = dims.iter().position(|d| *d == dim).ok_or_else(|| {
                ArrayError::UnsupportedAxis(format!("{} is not a dimension of this array", dim))
            })?;
            if values.len() != data.shape()[axis] {
                return Err(ArrayError::CoordinateMismatch {
                    axis: dim.to_string(),
                    coords: values.len(),
                    len: data.shape()[axis],
                });
            }
            map.insert(dim, values);
        }

        Ok(Self {
            data,
            dims,
            coords: map,
        })
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The underlying lazy array.
    pub fn data(&self) -> &LazyArray {
        &self.data
    }

    pub fn into_data(self) -> LazyArray {
        self.data
    }

    /// Coordinate labels of `dim`, if it has any.
    pub fn coords(&self, dim: Dim) -> Option<&CoordValues> {
        self.coords.get(&dim)
    }

    /// Axis position of `dim`.
    pub fn axis(&self, dim: Dim) -> Result<usize, ArrayError> {
        self.dims.iter().position(|d| *d == dim).ok_or_else(|| {
            ArrayError::UnsupportedAxis(format!("{} is not a dimension of this array", dim))
        })
    }

    /// Length of `dim`.
    pub fn len_of(&self, dim: Dim) -> Result<usize, ArrayError> {
        Ok(self.shape()[self.axis(dim)?])
    }

    fn lead_axis(&self, dim: Dim) -> Result<usize, ArrayError> {
        if dim.is_plane_axis() {
            return Err(ArrayError::UnsupportedAxis(format!(
                "{} is a plane axis",
                dim
            )));
        }
        self.axis(dim)
    }

    fn with_data(&self, data: LazyArray) -> Self {
        Self {
            data,
            dims: self.dims.clone(),
            coords: self.coords.clone(),
        }
    }

    /// Propagate valid values forward along `dim`.
    pub fn ffill(&self, dim: Dim) -> Result<Self, ArrayError> {
        Ok(self.with_data(self.data.ffill(self.lead_axis(dim)?)?))
    }

    /// Propagate valid values backward along `dim`.
    pub fn bfill(&self, dim: Dim) -> Result<Self, ArrayError> {
        Ok(self.with_data(self.data.bfill(self.lead_axis(dim)?)?))
    }

    /// Forward then backward fill along `dim`.
    pub fn fill_missing(&self, dim: Dim) -> Result<Self, ArrayError> {
        Ok(self.with_data(self.data.fill_missing(self.lead_axis(dim)?)?))
    }

    /// Defer applying `func` to every `(y, x)` plane.
    pub fn map_planes(&self, func: PlaneFn) -> Self {
        self.with_data(self.data.map_planes(func))
    }

    /// Select positions along leading dimensions, dropping those dimensions.
    pub fn isel(&self, selection: &[(Dim, usize)]) -> Result<Self, ArrayError> {
        let mut resolved = Vec::with_capacity(selection.len());
        for &(dim, index) in selection {
            let axis = self.lead_axis(dim)?;
            let len = self.shape()[axis];
            if index >= len {
                return Err(ArrayError::IndexOutOfBounds {
                    axis: dim.to_string(),
                    index,
                    len,
                });
            }
            if resolved.iter().any(|&(a, _)| a == axis) {
                return Err(ArrayError::UnsupportedAxis(format!(
                    "{} is selected more than once",
                    dim
                )));
            }
            resolved.push((axis, index));
        }
        Ok(self.take(&resolved))
    }

    /// Select validated `(axis, index)` pairs, dropping those axes.
    fn take(&self, selection: &[(usize, usize)]) -> Self {
        let dropped: Vec<Dim> = selection.iter().map(|&(axis, _)| self.dims[axis]).collect();
        Self {
            data: self.data.gather(selection),
            dims: self
                .dims
                .iter()
                .copied()
                .filter(|d| !dropped.contains(d))
                .collect(),
            coords: self
                .coords
                .iter()
                .filter(|(d, _)| !dropped.contains(d))
                .map(|(d, values)| (*d, values.clone()))
                .collect(),
        }
    }

    /// Select by coordinate label, dropping the selected dimensions.
    pub fn sel(&self, selection: &[(Dim, CoordLabel)]) -> Result<Self, ArrayError> {
        let indices = selection
            .iter()
            .map(|(dim, label)| {
                self.coords(*dim)
                    .and_then(|values| values.position(label))
                    .map(|index| (*dim, index))
                    .ok_or_else(|| ArrayError::LabelNotFound {
                        axis: dim.to_string(),
                        label: label.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.isel(&indices)
    }

    /// Iterate over the product of every labeled leading dimension not in
    /// `keep`.
    ///
    /// Each step yields the selected labels and the remaining sub-array,
    /// e.g. `keep = []` walks every coordinate-less `(y, x)` plane. Steps are
    /// built one at a time as the iterator advances. When `rng` is given the
    /// visiting order is shuffled with it.
    pub fn iter_selections(
        &self,
        keep: &[Dim],
        rng: Option<&mut dyn RngCore>,
    ) -> Result<impl Iterator<Item = Selection> + '_, ArrayError> {
        let mut iterated = Vec::new();
        for (axis, dim) in self.dims.iter().enumerate() {
            if dim.is_plane_axis() || keep.contains(dim) {
                continue;
            }
            if let Some(values) = self.coords(*dim) {
                iterated.push((axis, *dim, values));
            }
        }
        let lens: Vec<usize> = iterated.iter().map(|&(axis, _, _)| self.shape()[axis]).collect();
        let total: usize = lens.iter().product();

        let order = rng.map(|rng| {
            let mut order: Vec<usize> = (0..total).collect();
            order.shuffle(rng);
            order
        });

        Ok((0..total).map(move |step| {
            let mut rest = order.as_ref().map_or(step, |order| order[step]);
            let mut indices = vec![0; lens.len()];
            for (slot, &len) in indices.iter_mut().zip(&lens).rev() {
                *slot = rest % len;
                rest /= len;
            }

            let mut labels = Vec::with_capacity(indices.len());
            let mut selection = Vec::with_capacity(indices.len());
            for (&(axis, dim, values), &index) in iterated.iter().zip(&indices) {
                if let Some(label) = values.get(index) {
                    labels.push((dim, label));
                }
                selection.push((axis, index));
            }
            Selection {
                labels,
                array: self.take(&selection),
            }
        }))
    }

    /// Labels of every `(y, x)` plane that evaluates to all missing values.
    ///
    /// Forces evaluation of the whole array on the rayon pool, holding only
    /// the planes in flight and their fill lanes. Leading dimensions without
    /// coordinates are left out of the labels.
    pub fn missing_planes(&self) -> Result<Vec<Vec<(Dim, CoordLabel)>>, ArrayError> {
        let missing = self
            .data
            .find_planes(|plane| plane.iter().all(|v| v.is_nan()));
        let lead = &self.dims[..self.dims.len() - 2];

        Ok(missing
            .into_iter()
            .map(|flat| {
                self.data
                    .lead_index(flat)
                    .into_iter()
                    .zip(lead)
                    .filter_map(|(index, dim)| Some((*dim, self.coords(*dim)?.get(index)?)))
                    .collect()
            })
            .collect())
    }

    /// Evaluate the full array.
    pub fn compute(&self) -> Result<ArrayD<f32>, ArrayError> {
        self.data.compute()
    }

    /// Describe dims, shape and coordinates.
    pub fn summary(&self) -> ArraySummary {
        ArraySummary {
            dims: self.dims.clone(),
            shape: self.shape().to_vec(),
            coords: self.coords.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
