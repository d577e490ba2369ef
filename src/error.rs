use thiserror::Error;

use super::{DataType, Shape};

/// Everything that can go wrong when calling into this crate.
///
/// All of these are caller errors: the engine is deterministic, so retrying
/// the same call fails the same way. Missing values are ordinary data and
/// never produce an `Error`.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// An operation that needs equal shapes got unequal ones.
    #[error("shape mismatch: {lhs:?} vs {rhs:?}")]
    ShapeMismatch { lhs: Shape, rhs: Shape },

    /// Two shapes have a trailing pair of extents that are unequal and neither
    /// of which is `1`.
    #[error("cannot broadcast shape {lhs:?} with shape {rhs:?}")]
    BroadcastIncompatible { lhs: Shape, rhs: Shape },

    /// An operator is not defined for a data type.
    #[error("operator `{op}` is not defined for data type `{data_type}`")]
    UnsupportedType { op: &'static str, data_type: DataType },

    /// A section range lies outside its dimension, is empty, or has a bad
    /// stride.
    #[error("invalid range on dimension {dimension}: {reason}")]
    InvalidRange { dimension: usize, reason: String },

    /// A coordinate or position does not address an element.
    #[error("index {index:?} is out of range for shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Shape },

    /// A reduction axis is not a dimension of the array.
    #[error("axis {axis} is out of range for an array of rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },
}

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unsupported(op: &'static str, data_type: DataType) -> Self {
        Error::UnsupportedType { op, data_type }
    }

    pub(crate) fn invalid_range(dimension: usize, reason: impl Into<String>) -> Self {
        Error::InvalidRange { dimension, reason: reason.into() }
    }

    pub(crate) fn shape_mismatch(lhs: &[usize], rhs: &[usize]) -> Self {
        Error::ShapeMismatch { lhs: Shape::from_slice(lhs), rhs: Shape::from_slice(rhs) }
    }
}
