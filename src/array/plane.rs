//! Deferred 2D planes.
//!
//! A [`LazyPlane`] is a node in a small task graph. Leaves are deferred
//! closures (typically a tile read) or constant planes; inner nodes map a
//! plane through a function or pick one output of a fill lane. Nothing is
//! evaluated until [`LazyPlane::compute`] is called, and sibling leaves carry
//! no ordering dependency on each other.
//!
//! The graph holds no pixel data. Filled lanes live in a [`LaneCache`] owned
//! by a single evaluation and are released once every plane of the lane has
//! been handed out.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use ndarray::{Array2, ArrayView2};
use tracing::warn;

use super::fill::{fill_lane, FillDirection};

/// An evaluated 2D plane, indexed `(y, x)`.
pub type Plane = Array2<f32>;

/// Function applied to every plane by [`LazyPlane::map`].
pub type PlaneFn = Arc<dyn Fn(ArrayView2<'_, f32>) -> Plane + Send + Sync>;

/// Value used for missing data.
pub const MISSING: f32 = f32::NAN;

// =============================================================================
// Graph Nodes
// =============================================================================

enum PlaneNode {
    Deferred(Box<dyn Fn() -> Plane + Send + Sync>),
    Constant(f32),
    Map { input: LazyPlane, func: PlaneFn },
    Lane { lane: Arc<FillLane>, index: usize },
}

/// The planes along one axis of a lazy array, filled together.
pub(crate) struct FillLane {
    inputs: Vec<LazyPlane>,
    directions: Vec<FillDirection>,
}

impl FillLane {
    pub(crate) fn new(inputs: Vec<LazyPlane>, directions: Vec<FillDirection>) -> Self {
        Self { inputs, directions }
    }

    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn evaluate(&self, cache: &LaneCache) -> Vec<Plane> {
        // Inputs are computed on the calling thread: a job stolen while the
        // lane initialises could wait on this same lane.
        let mut planes: Vec<Plane> = self
            .inputs
            .iter()
            .map(|input| input.compute_in(cache))
            .collect();
        for direction in &self.directions {
            fill_lane(&mut planes, *direction);
        }
        planes
    }
}

// =============================================================================
// LaneCache
// =============================================================================

/// Filled lanes shared by the planes of one evaluation.
///
/// A lane is evaluated when the first of its planes is requested and dropped
/// from the cache when the last one is. A plane requested again after that
/// re-evaluates its lane.
#[derive(Default)]
pub(crate) struct LaneCache {
    lanes: Mutex<HashMap<usize, PendingLane>>,
}

struct PendingLane {
    result: Arc<OnceLock<Vec<Plane>>>,
    remaining: usize,
}

impl LaneCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn plane(&self, lane: &Arc<FillLane>, index: usize) -> Plane {
        let key = Arc::as_ptr(lane) as usize;
        let result = {
            let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
            let pending = lanes.entry(key).or_insert_with(|| PendingLane {
                result: Arc::new(OnceLock::new()),
                remaining: lane.len(),
            });
            pending.remaining -= 1;
            let result = Arc::clone(&pending.result);
            if pending.remaining == 0 {
                lanes.remove(&key);
            }
            result
        };
        result.get_or_init(|| lane.evaluate(self))[index].clone()
    }

    /// Number of lanes evaluated or awaiting evaluation and not yet released.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// =============================================================================
// LazyPlane
// =============================================================================

/// A deferred 2D `f32` plane of a fixed shape.
///
/// Cloning is cheap: clones share the same graph node.
#[derive(Clone)]
pub struct LazyPlane {
    node: Arc<PlaneNode>,
    shape: (usize, usize),
}

impl LazyPlane {
    /// Create a plane computed by `func` when evaluated.
    pub fn from_fn<F>(shape: (usize, usize), func: F) -> Self
    where
        F: Fn() -> Plane + Send + Sync + 'static,
    {
        Self {
            node: Arc::new(PlaneNode::Deferred(Box::new(func))),
            shape,
        }
    }

    /// Create a plane with every element set to `value`.
    pub fn full(shape: (usize, usize), value: f32) -> Self {
        Self {
            node: Arc::new(PlaneNode::Constant(value)),
            shape,
        }
    }

    /// Create a plane filled with the missing-value sentinel.
    pub fn missing(shape: (usize, usize)) -> Self {
        Self::full(shape, MISSING)
    }

    pub(crate) fn from_lane(shape: (usize, usize), lane: Arc<FillLane>, index: usize) -> Self {
        Self {
            node: Arc::new(PlaneNode::Lane { lane, index }),
            shape,
        }
    }

    /// Declared `(height, width)` of the plane.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Defer applying `func` to this plane.
    ///
    /// `func` must return a plane of the same shape as its input; any other
    /// shape is replaced with a missing plane at evaluation time.
    pub fn map(&self, func: PlaneFn) -> Self {
        Self {
            node: Arc::new(PlaneNode::Map {
                input: self.clone(),
                func,
            }),
            shape: self.shape,
        }
    }

    /// Evaluate the plane.
    ///
    /// A plane taken from a fill lane evaluates the whole lane; nothing is
    /// kept once the plane is returned.
    pub fn compute(&self) -> Plane {
        self.compute_in(&LaneCache::new())
    }

    /// Evaluate the plane, sharing filled lanes through `cache`.
    pub(crate) fn compute_in(&self, cache: &LaneCache) -> Plane {
        let plane = match self.node.as_ref() {
            PlaneNode::Deferred(func) => func(),
            PlaneNode::Constant(value) => Array2::from_elem(self.shape, *value),
            PlaneNode::Map { input, func } => {
                let source = input.compute_in(cache);
                func(source.view())
            }
            PlaneNode::Lane { lane, index } => cache.plane(lane, *index),
        };

        if plane.dim() != self.shape {
            warn!(
                expected = ?self.shape,
                actual = ?plane.dim(),
                "Plane evaluated to the wrong shape, substituting missing values"
            );
            return Array2::from_elem(self.shape, MISSING);
        }
        plane
    }
}

impl fmt::Debug for LazyPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.node.as_ref() {
            PlaneNode::Deferred(_) => "deferred",
            PlaneNode::Constant(_) => "constant",
            PlaneNode::Map { .. } => "map",
            PlaneNode::Lane { .. } => "lane",
        };
        f.debug_struct("LazyPlane")
            .field("kind", &kind)
            .field("shape", &self.shape)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
