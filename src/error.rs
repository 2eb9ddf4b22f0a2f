use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a single tile from disk.
///
/// These never escape the lazy tile reader: [`crate::tile::TileReader::load`]
/// converts every variant into a missing-value plane.
#[derive(Debug, Error)]
pub enum TileError {
    /// No file exists at the expected leaf path
    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    /// The decoded plane does not have the expected shape and resizing is disabled
    #[error(
        "Image shape {actual:?} does not match expected shape {expected:?}; \
         enable reshaping to resize the image to a standard shape"
    )]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Filesystem error other than a missing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded as an image
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The image is not a single-sample grayscale plane
    #[error("Unsupported sample layout: {0}")]
    UnsupportedLayout(String),
}

/// Errors from building or indexing lazy arrays
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// Stacked parts do not share one shape
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Stacking an empty list without a part shape
    #[error("Cannot stack an empty list of arrays without a part shape")]
    EmptyStack,

    /// Axis index is not one of the leading (non-plane) axes
    #[error("Axis {axis} is out of range for {leading} leading axes")]
    AxisOutOfRange { axis: usize, leading: usize },

    /// Operation is not defined on a plane axis
    #[error("Unsupported axis: {0}")]
    UnsupportedAxis(String),

    /// Index exceeds the axis length
    #[error("Index {index} is out of bounds for axis {axis} of length {len}")]
    IndexOutOfBounds {
        axis: String,
        index: usize,
        len: usize,
    },

    /// Coordinate label not present on the axis
    #[error("Label {label} not found on axis {axis}")]
    LabelNotFound { axis: String, label: String },

    /// Coordinate list length disagrees with the axis length
    #[error("Coordinates for {axis} have length {coords}, axis has length {len}")]
    CoordinateMismatch {
        axis: String,
        coords: usize,
        len: usize,
    },

    /// Number of dimension names disagrees with the array rank
    #[error("Expected {expected} dimension names, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from discovering and assembling an acquisition
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Filesystem error while scanning the acquisition directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern built from the base directory
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Error building the assembled array
    #[error("Array error: {0}")]
    Array(#[from] ArrayError),

    /// Experiment type has no loader in this crate
    #[error("Unsupported experiment type: {0}")]
    UnsupportedFormat(String),
}

/// Errors from the channel colour table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Channel name is not in the colour table
    #[error("Channel {0} is not known")]
    UnknownChannel(String),

    /// Hex code is not of the form `#rrggbb`
    #[error("Invalid hex colour: {0}")]
    InvalidHex(String),
}

/// Errors from rendering a composite preview
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error selecting or evaluating planes
    #[error("Array error: {0}")]
    Array(#[from] ArrayError),

    /// Channel has no display colour
    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    /// Input array is not laid out as (channel, y, x)
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// PNG encoding failed
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Writing the encoded image failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
