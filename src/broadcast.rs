//! What happens when two arrays of different shapes meet in a binary
//! operator.
//!
//! Shapes are aligned at their last dimension; missing leading dimensions
//! count as `1`. Each pair of extents must be equal, or one of them must be
//! `1`, in which case the sole element along that dimension is replicated to
//! fill the other extent. This is called "broadcasting".

use smallvec::smallvec;

use super::{Coord, Error, Result, Shape};

/// How two shapes relate under broadcasting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Broadcast {
    /// The shapes are equal; no broadcasting is needed.
    Same,
    /// The shapes differ but are compatible.
    Broadcastable,
    /// Some pair of aligned extents differ and neither is `1`.
    Incompatible,
}

/// Classifies the pair of shapes `a` and `b`.
pub fn check(a: &[usize], b: &[usize]) -> Broadcast {
    if a == b { return Broadcast::Same; }
    let compatible = a.iter().rev().zip(b.iter().rev())
        .all(|(&m, &n)| m == n || m == 1 || n == 1);
    if compatible { Broadcast::Broadcastable } else { Broadcast::Incompatible }
}

/// Returns the shape of the result of a binary operator on shapes `a` and
/// `b`.
///
/// ```
/// use meteoarray::broadcast_shape;
/// assert_eq!(broadcast_shape(&[3, 1], &[1, 4]).unwrap().as_slice(), &[3, 4]);
/// assert_eq!(broadcast_shape(&[5, 2, 3], &[3]).unwrap().as_slice(), &[5, 2, 3]);
/// assert!(broadcast_shape(&[2, 3], &[4, 3]).is_err());
/// ```
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Shape> {
    let rank = a.len().max(b.len());
    let mut shape: Shape = smallvec![0; rank];
    for (d, extent) in shape.iter_mut().enumerate() {
        let m = if d + a.len() >= rank { a[d + a.len() - rank] } else { 1 };
        let n = if d + b.len() >= rank { b[d + b.len() - rank] } else { 1 };
        *extent = match (m, n) {
            _ if m == n => m,
            (1, _) => n,
            (_, 1) => m,
            _ => return Err(Error::BroadcastIncompatible {
                lhs: Shape::from_slice(a),
                rhs: Shape::from_slice(b),
            }),
        };
    }
    Ok(shape)
}

// ----------------------------------------------------------------------------

/// Maps coordinates of a broadcast result back to one operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remap {
    /// How many leading result dimensions the operand lacks.
    skip: usize,
    /// For each operand dimension, whether its extent is `1` (so the
    /// coordinate is always `0`).
    pinned: smallvec::SmallVec<[bool; 6]>,
}

impl Remap {
    /// The remap of an operand of shape `shape` into a result of rank
    /// `rank`. `shape` must broadcast to that result.
    pub fn new(shape: &[usize], rank: usize) -> Self {
        debug_assert!(shape.len() <= rank);
        Remap { skip: rank - shape.len(), pinned: shape.iter().map(|&n| n == 1).collect() }
    }

    /// Writes into `coord` the operand coordinate that result coordinate
    /// `out` reads from. `coord` must have the operand's rank.
    #[inline]
    pub fn apply(&self, out: &[usize], coord: &mut [usize]) {
        for ((c, &o), &pinned) in coord.iter_mut().zip(&out[self.skip..]).zip(&self.pinned) {
            *c = if pinned { 0 } else { o };
        }
    }
}

/// Everything the elementwise dispatcher needs to know about broadcasting
/// two operands together.
#[derive(Debug, Clone)]
pub struct Plan {
    shape: Shape,
    same: bool,
    lhs: Remap,
    rhs: Remap,
}

impl Plan {
    /// Fails with [`Error::BroadcastIncompatible`] if `lhs` and `rhs` do not
    /// broadcast.
    pub fn new(lhs: &[usize], rhs: &[usize]) -> Result<Self> {
        let shape = broadcast_shape(lhs, rhs)?;
        Ok(Plan {
            same: lhs == rhs,
            lhs: Remap::new(lhs, shape.len()),
            rhs: Remap::new(rhs, shape.len()),
            shape,
        })
    }

    /// The shape of the result.
    pub fn shape(&self) -> &[usize] { &self.shape }

    /// Returns `true` if both operands have the result's shape.
    pub fn is_same(&self) -> bool { self.same }

    /// Maps result coordinate `out` to a coordinate of each operand.
    #[inline]
    pub fn index(&self, out: &[usize], lhs: &mut Coord, rhs: &mut Coord) {
        self.lhs.apply(out, lhs);
        self.rhs.apply(out, rhs);
    }
}

// ----------------------------------------------------------------------------
