//! Composite previews.
//!
//! Renders the channels at one `(time, region, field)` position as a single
//! tinted RGB image.
//!
//! ```text
//! (channel, y, x) ──▶ min-max per channel ──▶ tint + sum ──▶ RgbImage ──▶ PNG
//! ```

mod composite;
mod encode;

pub use composite::{normalize_plane, CompositeRenderer};
pub use encode::{encode_png, write_png};
