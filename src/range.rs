//! Per-dimension selections for sectioning an array.

use super::{Error, Result};

/// Selects `first, first + stride, ...` up to and including `last` along one
/// dimension of an array. Used by [`NDArray::section()`].
///
/// A `Range` is only checked against a dimension when it is applied.
///
/// [`NDArray::section()`]: super::NDArray::section
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    first: usize,
    last: usize,
    stride: usize,
}

impl Range {
    /// `first..=last` with stride 1.
    pub const fn new(first: usize, last: usize) -> Self { Range { first, last, stride: 1 } }

    pub const fn with_stride(first: usize, last: usize, stride: usize) -> Self {
        Range { first, last, stride }
    }

    /// The whole of a dimension of extent `extent`.
    pub const fn full(extent: usize) -> Self { Range::new(0, extent.saturating_sub(1)) }

    /// The single element `i`.
    pub const fn single(i: usize) -> Self { Range::new(i, i) }

    pub fn first(&self) -> usize { self.first }
    pub fn last(&self) -> usize { self.last }
    pub fn stride(&self) -> usize { self.stride }

    /// The number of selected elements. `last` itself is selected only if
    /// `stride` divides `last - first`.
    pub fn length(&self) -> usize {
        if self.last < self.first || self.stride == 0 { return 0; }
        (self.last - self.first) / self.stride + 1
    }

    /// The selected indices, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        (self.first..=self.last).step_by(self.stride.max(1)).take(self.length())
    }

    /// Checks that this range selects at least one element of dimension
    /// `dimension`, whose extent is `extent`.
    pub(crate) fn validate(&self, dimension: usize, extent: usize) -> Result<()> {
        if self.stride == 0 {
            return Err(Error::invalid_range(dimension, "stride must be positive"));
        }
        if self.last < self.first {
            return Err(Error::invalid_range(
                dimension,
                format!("last {} is before first {}", self.last, self.first),
            ));
        }
        if self.last >= extent {
            return Err(Error::invalid_range(
                dimension,
                format!("{}..={} is outside 0..{extent}", self.first, self.last),
            ));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
