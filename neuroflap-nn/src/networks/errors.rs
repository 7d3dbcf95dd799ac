use thiserror::Error;

use std::io;

/// An error type indicating an invalid or
/// incompatible network shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Fewer layers than input, hidden and output.
    #[error("a network needs at least 3 layers (input, hidden, output), got {0}")]
    TooFewLayers(usize),
    /// A layer was declared with no neurons.
    #[error("layer {0} has no neurons")]
    EmptyLayer(usize),
    /// Two networks that were expected to share a shape don't.
    #[error("network shapes differ: expected {expected:?}, found {found:?}")]
    Mismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

/// An error type indicating a failure to
/// write or read a persisted network.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The underlying file could not be read or written.
    #[error("network file i/o failed: {0}")]
    Io(#[from] io::Error),
    /// A line did not hold a number.
    #[error("line {line}: `{value}` is not a number")]
    Parse { line: usize, value: String },
    /// The file holds a different number of values than the
    /// network's shape requires, usually because it was saved
    /// from a network with different layer sizes.
    #[error("network file holds {found} values but the network needs {expected}")]
    ValueCount { expected: usize, found: usize },
}
