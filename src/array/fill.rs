//! Element-wise propagation of valid values into missing (NaN) elements.

use ndarray::Zip;

use super::plane::Plane;

/// Direction in which valid values are propagated along a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDirection {
    /// Carry the last valid value towards higher indices.
    Forward,
    /// Carry the next valid value towards lower indices.
    Backward,
}

/// Fill NaN elements of every plane from its neighbours along the lane.
///
/// Works element by element: each NaN takes the value of the nearest
/// preceding (forward) or following (backward) plane that is valid at the
/// same `(y, x)` position. Elements with no valid neighbour stay NaN.
pub fn fill_lane(planes: &mut [Plane], direction: FillDirection) {
    let n = planes.len();
    if n < 2 {
        return;
    }

    match direction {
        FillDirection::Forward => {
            for i in 1..n {
                let (done, rest) = planes.split_at_mut(i);
                propagate(&mut rest[0], &done[i - 1]);
            }
        }
        FillDirection::Backward => {
            for i in (0..n - 1).rev() {
                let (head, done) = planes.split_at_mut(i + 1);
                propagate(&mut head[i], &done[0]);
            }
        }
    }
}

fn propagate(target: &mut Plane, source: &Plane) {
    Zip::from(target).and(source).for_each(|value, &neighbour| {
        if value.is_nan() {
            *value = neighbour;
        }
    });
}

// =============================================================================
// Tests
// =============================================================================
