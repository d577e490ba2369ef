//! The mapping from coordinates to storage slots.
//!
//! An [`Index`] is a shape, one signed stride per dimension and an offset.
//! The element at coordinate `c` lives in slot `offset + Σ c[i] * strides[i]`.
//! Views (sections, transposes, flips) are new `Index`es over the same
//! storage, so none of them copy elements.

use smallvec::smallvec;

use super::{Coord, Error, Range, Result, Shape, Strides};

/// Returns the strides of a contiguous row-major array: the last dimension
/// varies fastest.
///
/// ```
/// use meteoarray::row_major_strides;
/// assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
/// ```
pub fn row_major_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = smallvec![0; shape.len()];
    let mut stride = 1isize;
    for (d, &extent) in shape.iter().enumerate().rev() {
        strides[d] = stride;
        stride *= extent as isize;
    }
    strides
}

/// The number of elements in an array of shape `shape`. This is `1` for
/// rank 0.
pub fn size_of(shape: &[usize]) -> usize { shape.iter().product() }

fn out_of_range(index: &[usize], shape: &[usize]) -> Error {
    Error::IndexOutOfRange { index: index.to_vec(), shape: Shape::from_slice(shape) }
}

fn check_axis(axis: usize, rank: usize) -> Result<()> {
    if axis < rank { Ok(()) } else { Err(Error::AxisOutOfRange { axis, rank }) }
}

// ----------------------------------------------------------------------------

/// The shape, strides and offset of an array or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Index {
    /// The index of a contiguous row-major array.
    pub fn new(shape: &[usize]) -> Self {
        Index { shape: Shape::from_slice(shape), strides: row_major_strides(shape), offset: 0 }
    }

    /// An arbitrary strided index. The caller ensures every reachable slot is
    /// non-negative.
    pub(crate) fn with_strides(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Index { shape, strides, offset }
    }

    pub fn rank(&self) -> usize { self.shape.len() }
    pub fn shape(&self) -> &[usize] { &self.shape }
    pub fn strides(&self) -> &[isize] { &self.strides }
    pub fn offset(&self) -> usize { self.offset }
    pub fn size(&self) -> usize { size_of(&self.shape) }

    /// Returns `true` if the slots of this index are exactly `0..size()` in
    /// row-major order, so that iteration can skip the stride arithmetic.
    pub fn is_fast(&self) -> bool {
        self.offset == 0 && self.strides == row_major_strides(&self.shape)
    }

    /// The largest slot this index can reach, or `None` if it has no
    /// elements.
    pub fn max_slot(&self) -> Option<usize> {
        if self.size() == 0 { return None; }
        let mut slot = self.offset as isize;
        for (&extent, &stride) in self.shape.iter().zip(&self.strides) {
            if stride > 0 { slot += (extent as isize - 1) * stride; }
        }
        Some(slot as usize)
    }

    /// Returns the storage slot of `coord`.
    pub fn slot(&self, coord: &[usize]) -> Result<usize> {
        if coord.len() != self.rank() || coord.iter().zip(&self.shape).any(|(&c, &n)| c >= n) {
            return Err(out_of_range(coord, &self.shape));
        }
        Ok(self.slot_unchecked(coord))
    }

    /// As [`slot()`], but `coord` must be valid.
    ///
    /// [`slot()`]: Self::slot
    #[inline]
    pub(crate) fn slot_unchecked(&self, coord: &[usize]) -> usize {
        let mut slot = self.offset as isize;
        for (&c, &stride) in coord.iter().zip(&self.strides) { slot += c as isize * stride; }
        slot as usize
    }

    /// Returns the row-major position (in `0..size()`) of `coord`.
    pub fn position(&self, coord: &[usize]) -> Result<usize> {
        if coord.len() != self.rank() || coord.iter().zip(&self.shape).any(|(&c, &n)| c >= n) {
            return Err(out_of_range(coord, &self.shape));
        }
        Ok(coord.iter().zip(&self.shape).fold(0, |position, (&c, &n)| position * n + c))
    }

    /// Returns the coordinate at row-major `position`.
    pub fn coordinate(&self, position: usize) -> Result<Coord> {
        if position >= self.size() { return Err(out_of_range(&[position], &self.shape)); }
        let mut coord: Coord = smallvec![0; self.rank()];
        let mut rest = position;
        for (c, &n) in coord.iter_mut().zip(&self.shape).rev() {
            *c = rest % n;
            rest /= n;
        }
        Ok(coord)
    }

    /// Returns the storage slot of the element at row-major `position`.
    pub fn slot_of_position(&self, position: usize) -> Result<usize> {
        if self.is_fast() {
            if position >= self.size() { return Err(out_of_range(&[position], &self.shape)); }
            return Ok(position);
        }
        Ok(self.slot_unchecked(&self.coordinate(position)?))
    }

    /// Iterates over the storage slots in row-major order.
    pub fn slots(&self) -> Slots<'_> { Slots::new(self) }

    /// Equivalent to, but more efficient than,
    /// ```text
    /// for p in 0..self.size() { f(self.slot_of_position(p).unwrap()); }
    /// ```
    pub fn each(&self, f: impl FnMut(usize)) { self.slots().for_each(f) }

    // ---- Views ----

    /// Restricts every dimension to a [`Range`]. There must be one `Range` per
    /// dimension.
    pub fn section(&self, ranges: &[Range]) -> Result<Index> {
        if ranges.len() != self.rank() {
            return Err(Error::invalid_range(
                ranges.len().min(self.rank()),
                format!("expected {} ranges, got {}", self.rank(), ranges.len()),
            ));
        }
        let mut offset = self.offset as isize;
        let mut shape = Shape::with_capacity(self.rank());
        let mut strides = Strides::with_capacity(self.rank());
        for (d, range) in ranges.iter().enumerate() {
            range.validate(d, self.shape[d])?;
            offset += range.first() as isize * self.strides[d];
            shape.push(range.length());
            strides.push(range.stride() as isize * self.strides[d]);
        }
        Ok(Index::with_strides(shape, strides, offset as usize))
    }

    /// Fixes dimension `dimension` at `i`, removing it.
    pub fn slice(&self, dimension: usize, i: usize) -> Result<Index> {
        check_axis(dimension, self.rank())?;
        if i >= self.shape[dimension] {
            return Err(Error::invalid_range(
                dimension,
                format!("{i} is outside 0..{}", self.shape[dimension]),
            ));
        }
        let mut index = self.clone();
        index.offset = (self.offset as isize + i as isize * self.strides[dimension]) as usize;
        index.shape.remove(dimension);
        index.strides.remove(dimension);
        Ok(index)
    }

    /// Swaps two dimensions.
    pub fn transpose(&self, a: usize, b: usize) -> Result<Index> {
        check_axis(a, self.rank())?;
        check_axis(b, self.rank())?;
        let mut index = self.clone();
        index.shape.swap(a, b);
        index.strides.swap(a, b);
        Ok(index)
    }

    /// Reorders the dimensions: dimension `d` of the result is dimension
    /// `order[d]` of `self`. `order` must be a permutation of `0..rank()`.
    pub fn permute(&self, order: &[usize]) -> Result<Index> {
        let rank = self.rank();
        let mut seen: Shape = smallvec![0; rank];
        for &d in order {
            check_axis(d, rank)?;
            seen[d] += 1;
        }
        if order.len() != rank || seen.iter().any(|&count| count != 1) {
            return Err(Error::invalid_range(0, format!("{order:?} is not a permutation of 0..{rank}")));
        }
        let shape = order.iter().map(|&d| self.shape[d]).collect();
        let strides = order.iter().map(|&d| self.strides[d]).collect();
        Ok(Index::with_strides(shape, strides, self.offset))
    }

    /// Reverses the direction of one dimension.
    pub fn flip(&self, dimension: usize) -> Result<Index> {
        check_axis(dimension, self.rank())?;
        let mut index = self.clone();
        let extent = self.shape[dimension];
        if extent > 0 {
            let stride = self.strides[dimension];
            index.offset = (self.offset as isize + (extent as isize - 1) * stride) as usize;
            index.strides[dimension] = -stride;
        }
        Ok(index)
    }

    /// Removes a dimension of extent 1.
    pub fn remove_one(&self, dimension: usize) -> Result<Index> {
        check_axis(dimension, self.rank())?;
        if self.shape[dimension] != 1 {
            return Err(Error::invalid_range(dimension, "extent is not 1"));
        }
        let mut index = self.clone();
        index.shape.remove(dimension);
        index.strides.remove(dimension);
        Ok(index)
    }

    /// Inserts a dimension of extent 1 before `dimension`.
    pub fn insert_one(&self, dimension: usize) -> Result<Index> {
        check_axis(dimension, self.rank() + 1)?;
        // Any stride works for extent 1; this one keeps contiguous indexes fast.
        let stride = if dimension < self.rank() {
            self.strides[dimension] * self.shape[dimension] as isize
        } else {
            1
        };
        let mut index = self.clone();
        index.shape.insert(dimension, 1);
        index.strides.insert(dimension, stride);
        Ok(index)
    }
}

// ----------------------------------------------------------------------------

/// An odometer over the coordinates of a shape, in row-major order.
#[derive(Debug, Clone)]
pub struct Counter {
    shape: Shape,
    current: Coord,
    exhausted: bool,
}

impl Counter {
    /// A counter at the first coordinate of `shape`. A shape with a zero
    /// extent has no coordinates; rank 0 has exactly one.
    pub fn new(shape: &[usize]) -> Self {
        Counter {
            shape: Shape::from_slice(shape),
            current: smallvec![0; shape.len()],
            exhausted: shape.contains(&0),
        }
    }

    /// The current coordinate, or `None` once exhausted.
    pub fn current(&self) -> Option<&[usize]> {
        if self.exhausted { None } else { Some(&self.current) }
    }

    pub fn exhausted(&self) -> bool { self.exhausted }

    /// Moves to the next coordinate. Returns `false` if there is none.
    pub fn increment(&mut self) -> bool {
        if self.exhausted { return false; }
        for d in (0..self.shape.len()).rev() {
            self.current[d] += 1;
            if self.current[d] < self.shape[d] { return true; }
            self.current[d] = 0;
        }
        self.exhausted = true;
        false
    }
}

/// Iterates over the coordinates of a shape in row-major order.
#[derive(Debug, Clone)]
pub struct Coordinates(Counter);

impl Coordinates {
    pub fn new(shape: &[usize]) -> Self { Coordinates(Counter::new(shape)) }
}

impl Iterator for Coordinates {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let coord = Coord::from_slice(self.0.current()?);
        self.0.increment();
        Some(coord)
    }
}

/// The return type of [`Index::slots()`].
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    index: &'a Index,
    state: State,
    remaining: usize,
}

#[derive(Debug, Clone)]
enum State {
    Fast(std::ops::Range<usize>),
    General(Counter),
}

impl<'a> Slots<'a> {
    fn new(index: &'a Index) -> Self {
        let size = index.size();
        let state = if index.is_fast() {
            State::Fast(0..size)
        } else {
            State::General(Counter::new(index.shape()))
        };
        Slots { index, state, remaining: size }
    }
}

impl<'a> Iterator for Slots<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let slot = match &mut self.state {
            State::Fast(range) => range.next()?,
            State::General(counter) => {
                let slot = self.index.slot_unchecked(counter.current()?);
                counter.increment();
                slot
            },
        };
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<'a> ExactSizeIterator for Slots<'a> {}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides() {
        assert_eq!(row_major_strides(&[3, 4]).as_slice(), &[4, 1]);
        assert!(row_major_strides(&[]).is_empty());
        assert_eq!(size_of(&[]), 1);
        assert_eq!(size_of(&[3, 0, 2]), 0);
    }

    #[test]
    fn slot_and_position() {
        let index = Index::new(&[2, 3, 4]);
        assert!(index.is_fast());
        assert_eq!(index.slot(&[1, 2, 3]), Ok(23));
        assert_eq!(index.position(&[1, 0, 2]), Ok(14));
        assert_eq!(index.coordinate(14).unwrap().as_slice(), &[1, 0, 2]);
        assert!(index.slot(&[2, 0, 0]).is_err());
        assert!(index.slot(&[0, 0]).is_err());
        assert!(index.slot_of_position(24).is_err());
        assert_eq!(index.max_slot(), Some(23));
    }

    #[test]
    fn counter() {
        let mut counter = Counter::new(&[2, 2]);
        let mut seen = vec![];
        while let Some(coord) = counter.current() {
            seen.push(coord.to_vec());
            counter.increment();
        }
        assert_eq!(seen, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
        assert!(!counter.increment());
        assert_eq!(Coordinates::new(&[]).count(), 1);
        assert_eq!(Coordinates::new(&[4, 0]).count(), 0);
    }

    #[test]
    fn transpose_is_general() {
        let index = Index::new(&[2, 3]).transpose(0, 1).unwrap();
        assert!(!index.is_fast());
        assert_eq!(index.shape(), &[3, 2]);
        assert_eq!(index.slots().collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);
        for p in 0..6 {
            assert_eq!(index.slot_of_position(p), Ok(index.slots().nth(p).unwrap()));
        }
    }

    #[test]
    fn section() {
        let index = Index::new(&[4, 5]);
        let section = index.section(&[Range::new(1, 3), Range::with_stride(0, 4, 2)]).unwrap();
        assert_eq!(section.shape(), &[3, 3]);
        assert_eq!(section.strides(), &[5, 2]);
        assert_eq!(section.offset(), 5);
        assert_eq!(section.slots().collect::<Vec<_>>(), vec![5, 7, 9, 10, 12, 14, 15, 17, 19]);
        assert!(index.section(&[Range::new(0, 4), Range::full(5)]).is_err());
        assert!(index.section(&[Range::full(4)]).is_err());
    }

    #[test]
    fn views() {
        let index = Index::new(&[2, 3]);
        let row = index.slice(0, 1).unwrap();
        assert_eq!(row.slots().collect::<Vec<_>>(), vec![3, 4, 5]);
        let flipped = index.flip(1).unwrap();
        assert_eq!(flipped.slots().collect::<Vec<_>>(), vec![2, 1, 0, 5, 4, 3]);
        assert_eq!(flipped.max_slot(), Some(5));
        let permuted = Index::new(&[2, 3, 4]).permute(&[2, 0, 1]).unwrap();
        assert_eq!(permuted.shape(), &[4, 2, 3]);
        assert!(index.permute(&[0, 0]).is_err());
        assert_eq!(index.transpose(0, 2), Err(Error::AxisOutOfRange { axis: 2, rank: 2 }));
        let expanded = index.insert_one(0).unwrap();
        assert_eq!(expanded.shape(), &[1, 2, 3]);
        assert!(expanded.is_fast());
        assert_eq!(expanded.remove_one(0).unwrap(), index);
        assert!(index.remove_one(1).is_err());
    }
}
