//! Lazy array engine.
//!
//! Acquisitions are far larger than memory, so the assembled array is a task
//! graph rather than pixel data:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                LabeledArray                  │
//! │     (dims, coordinate labels, sel/isel)      │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                  LazyArray                   │
//! │  (stack, select, fill lanes, rayon compute)  │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                  LazyPlane                   │
//! │  deferred read │ constant │ map │ fill lane  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Leaves carry no ordering dependency on each other. [`LazyArray::compute`]
//! evaluates them on the rayon pool in any order.

mod fill;
mod labeled;
mod lazy;
mod plane;

pub use fill::{fill_lane, FillDirection};
pub use labeled::{ArraySummary, CoordLabel, CoordValues, Dim, LabeledArray, Selection};
pub use lazy::LazyArray;
pub use plane::{LazyPlane, Plane, PlaneFn, MISSING};
