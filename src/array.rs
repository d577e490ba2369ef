//! The array value type: a typed view of shared storage, its element
//! accessors, and the views and copies that can be made of it.

use std::cell::Ref;

use log::trace;

use super::element::{with_element, Element};
use super::index::{size_of, Slots};
use super::{Cursor, DataType, Date, Error, Index, Range, Result, Scalar, Storage};
use num_complex::Complex64;

/// A typed, shaped, strided view of some [`Storage`].
///
/// Cloning an `NDArray` gives another view of the same elements, as do
/// [`section()`], [`transpose()`] and friends: a write through any of them is
/// visible through all of them. Use [`copy()`] to get independent elements.
///
/// `NDArray` uses shared mutable storage without locking, so it is neither
/// `Send` nor `Sync`.
///
/// [`section()`]: Self::section
/// [`transpose()`]: Self::transpose
/// [`copy()`]: Self::copy
#[derive(Debug, Clone)]
pub struct NDArray {
    index: Index,
    storage: Storage,
}

impl NDArray {
    /// Allocates a contiguous array of zeros.
    ///
    /// ```
    /// use meteoarray::{DataType, NDArray};
    /// let a = NDArray::zeros(DataType::Float, &[2, 3]);
    /// assert_eq!(a.shape(), &[2, 3]);
    /// assert_eq!(a.size(), 6);
    /// assert_eq!(a.get_double(&[1, 2]), Ok(0.0));
    /// ```
    pub fn zeros(data_type: DataType, shape: &[usize]) -> Self {
        NDArray { index: Index::new(shape), storage: Storage::zeros(data_type, size_of(shape)) }
    }

    /// A contiguous view of the first elements of `storage`.
    pub fn from_storage(shape: &[usize], storage: Storage) -> Result<Self> {
        NDArray::from_index(Index::new(shape), storage)
    }

    /// A view of `storage` through `index`. Fails if `index` reaches outside
    /// `storage`.
    pub fn from_index(index: Index, storage: Storage) -> Result<Self> {
        if let Some(slot) = index.max_slot() {
            if slot >= storage.len() {
                return Err(Error::IndexOutOfRange {
                    index: vec![slot],
                    shape: smallvec::smallvec![storage.len()],
                });
            }
        }
        Ok(NDArray { index, storage })
    }

    /// A contiguous array holding `values` in row-major order.
    ///
    /// ```
    /// use meteoarray::NDArray;
    /// let a = NDArray::from_vec(&[2, 2], vec![1i32, 2, 3, 4]).unwrap();
    /// assert_eq!(a.get_int(&[1, 0]), Ok(3));
    /// assert!(NDArray::from_vec(&[3], vec![1i32]).is_err());
    /// ```
    pub fn from_vec<T: Element>(shape: &[usize], values: Vec<T>) -> Result<Self> {
        if values.len() != size_of(shape) {
            return Err(Error::shape_mismatch(shape, &[values.len()]));
        }
        Ok(NDArray { index: Index::new(shape), storage: T::into_storage(values) })
    }

    /// A rank-0 array holding `value` in its own type.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        NDArray { index: Index::new(&[]), storage: Storage::from_scalar(value.into()) }
    }

    pub fn data_type(&self) -> DataType { self.storage.data_type() }
    pub fn index(&self) -> &Index { &self.index }
    pub fn storage(&self) -> &Storage { &self.storage }
    pub fn shape(&self) -> &[usize] { self.index.shape() }
    pub fn rank(&self) -> usize { self.index.rank() }
    pub fn size(&self) -> usize { self.index.size() }

    /// Returns `true` if this array is contiguous and row-major, so that
    /// elementwise operators can take the fast path.
    pub fn is_fast(&self) -> bool { self.index.is_fast() }

    /// Returns `true` if `self` and `other` are views of the same storage.
    pub fn shares_storage(&self, other: &NDArray) -> bool { self.storage.ptr_eq(&other.storage) }

    // ---- Element access ----

    /// Reads the element at `coord` as a `T`.
    pub fn get<T: Element>(&self, coord: &[usize]) -> Result<T> {
        self.read(self.index.slot(coord)?)
    }

    /// Converts `value` to this array's type and writes it at `coord`.
    pub fn set<T: Element>(&self, coord: &[usize], value: T) -> Result<()> {
        self.write(self.index.slot(coord)?, value)
    }

    /// Reads the element at row-major `position` as a `T`.
    pub fn get_flat<T: Element>(&self, position: usize) -> Result<T> {
        self.read(self.index.slot_of_position(position)?)
    }

    /// Converts `value` to this array's type and writes it at row-major
    /// `position`.
    pub fn set_flat<T: Element>(&self, position: usize, value: T) -> Result<()> {
        self.write(self.index.slot_of_position(position)?, value)
    }

    pub(crate) fn read<T: Element>(&self, slot: usize) -> Result<T> {
        if let Some(buffer) = T::buffer(&self.storage) {
            return Ok(buffer.borrow()[slot].clone());
        }
        let scalar = self.storage.get(slot)?;
        T::from_scalar(&scalar).ok_or_else(|| Error::unsupported("get", self.data_type()))
    }

    pub(crate) fn write<T: Element>(&self, slot: usize, value: T) -> Result<()> {
        if let Some(buffer) = T::buffer(&self.storage) {
            buffer.borrow_mut()[slot] = value;
            return Ok(());
        }
        self.storage.set(slot, &value.into_scalar())
    }

    /// Iterates over the elements in row-major order, converted to `T`.
    /// Elements that have no conversion to `T` read as missing.
    pub fn values<T: Element>(&self) -> Values<'_, T> {
        Values { reader: self.reader(), slots: self.index.slots() }
    }

    /// Iterates over the elements that are not missing, in row-major order,
    /// together with their row-major positions.
    pub fn valid_values<T: Element>(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        let reader = self.reader::<T>();
        self.index.slots().enumerate()
            .filter_map(move |(position, slot)| reader.get_valid(slot).map(|value| (position, value)))
    }

    /// The elements in row-major order, converted to `T`.
    pub fn to_vec<T: Element>(&self) -> Vec<T> { self.values().collect() }

    pub(crate) fn reader<T: Element>(&self) -> Reader<'_, T> { Reader::new(&self.storage) }

    /// A cursor that visits every element in row-major order.
    pub fn cursor(&self) -> Cursor<'_> { Cursor::new(self) }

    // ---- Views and copies ----

    fn view(&self, index: Index) -> NDArray {
        NDArray { index, storage: self.storage.clone() }
    }

    /// A view of the elements selected by one [`Range`] per dimension.
    ///
    /// ```
    /// use meteoarray::{NDArray, Range};
    /// let a = NDArray::from_vec(&[3, 4], (0..12).collect::<Vec<i32>>()).unwrap();
    /// let s = a.section(&[Range::new(1, 2), Range::with_stride(0, 3, 2)]).unwrap();
    /// assert_eq!(s.to_vec::<i32>(), vec![4, 6, 8, 10]);
    /// s.set_int(&[0, 0], -1).unwrap();
    /// assert_eq!(a.get_int(&[1, 0]), Ok(-1));
    /// ```
    pub fn section(&self, ranges: &[Range]) -> Result<NDArray> {
        let index = self.index.section(ranges)?;
        trace!("section {:?} -> {:?}", self.shape(), index.shape());
        Ok(self.view(index))
    }

    /// A view with dimension `dimension` fixed at `i`.
    pub fn slice(&self, dimension: usize, i: usize) -> Result<NDArray> {
        Ok(self.view(self.index.slice(dimension, i)?))
    }

    /// A view with dimensions `a` and `b` swapped.
    pub fn transpose(&self, a: usize, b: usize) -> Result<NDArray> {
        Ok(self.view(self.index.transpose(a, b)?))
    }

    /// A view whose dimension `d` is dimension `order[d]` of `self`.
    pub fn permute(&self, order: &[usize]) -> Result<NDArray> {
        Ok(self.view(self.index.permute(order)?))
    }

    /// A view with dimension `dimension` reversed.
    pub fn flip(&self, dimension: usize) -> Result<NDArray> {
        Ok(self.view(self.index.flip(dimension)?))
    }

    /// A view without dimension `dimension`, which must have extent 1.
    pub fn remove_one(&self, dimension: usize) -> Result<NDArray> {
        Ok(self.view(self.index.remove_one(dimension)?))
    }

    /// A view with a new dimension of extent 1 before `dimension`.
    pub fn insert_one(&self, dimension: usize) -> Result<NDArray> {
        Ok(self.view(self.index.insert_one(dimension)?))
    }

    /// The same elements in row-major order with a different shape. This is a
    /// view if `self` is fast, and a copy otherwise.
    pub fn reshape(&self, shape: &[usize]) -> Result<NDArray> {
        if size_of(shape) != self.size() {
            return Err(Error::shape_mismatch(self.shape(), shape));
        }
        trace!("reshape {:?} -> {:?} (view: {})", self.shape(), shape, self.is_fast());
        let source = if self.is_fast() { self.clone() } else { self.copy() };
        Ok(source.view(Index::new(shape)))
    }

    /// A contiguous copy with independent storage.
    ///
    /// ```
    /// use meteoarray::NDArray;
    /// let a = NDArray::from_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let t = a.transpose(0, 1).unwrap().copy();
    /// assert!(t.is_fast());
    /// assert_eq!(t.to_vec::<f64>(), vec![1.0, 3.0, 2.0, 4.0]);
    /// ```
    pub fn copy(&self) -> NDArray {
        NDArray { index: Index::new(self.shape()), storage: self.storage.gather(self.index.slots()) }
    }

    /// A contiguous copy converted to `data_type`. Missing values stay
    /// missing. Fails if some element has no conversion.
    pub fn astype(&self, data_type: DataType) -> Result<NDArray> {
        if data_type == self.data_type() { return Ok(self.copy()); }
        let values = with_element!(data_type, T => {
            let mut values: Vec<T> = Vec::with_capacity(self.size());
            for slot in self.index.slots() {
                let scalar = self.storage.get(slot)?;
                values.push(T::from_scalar(&scalar)
                    .ok_or_else(|| Error::unsupported("astype", scalar.data_type()))?);
            }
            T::into_storage(values)
        });
        Ok(NDArray { index: Index::new(self.shape()), storage: values })
    }

    /// Writes the elements of `source` into `self`, converting them to this
    /// array's type. The shapes must be equal.
    pub fn assign(&self, source: &NDArray) -> Result<()> {
        if self.shape() != source.shape() {
            return Err(Error::shape_mismatch(self.shape(), source.shape()));
        }
        // `source` may alias `self`; read everything before writing.
        let source = source.copy();
        for (position, slot) in self.index.slots().enumerate() {
            self.storage.set(slot, &source.storage.get(position)?)?;
        }
        Ok(())
    }

    /// Sets every element to `value`.
    pub fn fill(&self, value: impl Into<Scalar>) -> Result<()> {
        let value = value.into();
        for slot in self.index.slots() { self.storage.set(slot, &value)?; }
        Ok(())
    }
}

macro_rules! typed_accessors {
    ($($ty:ty: $get:ident, $set:ident;)*) => {
        /// Typed accessors. These convert between numeric representations,
        /// narrowing or widening as needed.
        impl NDArray {
            $(
                pub fn $get(&self, coord: &[usize]) -> Result<$ty> { self.get(coord) }
                pub fn $set(&self, coord: &[usize], value: $ty) -> Result<()> { self.set(coord, value) }
            )*
        }
    };
}

typed_accessors! {
    i8: get_byte, set_byte;
    i16: get_short, set_short;
    i32: get_int, set_int;
    i64: get_long, set_long;
    f32: get_float, set_float;
    f64: get_double, set_double;
    bool: get_boolean, set_boolean;
    Complex64: get_complex, set_complex;
    String: get_string, set_string;
    Date: get_date, set_date;
    Scalar: get_object, set_object;
}

// ----------------------------------------------------------------------------

/// Reads elements of some storage as `T`, borrowing the buffer once if it
/// already holds `T`s.
pub(crate) struct Reader<'a, T: Element> {
    native: Option<Ref<'a, Vec<T>>>,
    storage: &'a Storage,
}

impl<'a, T: Element> Reader<'a, T> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Reader { native: T::buffer(storage).map(|buffer| buffer.borrow()), storage }
    }

    /// The element at `slot` converted to `T`. Elements without a conversion
    /// read as missing.
    #[inline]
    pub(crate) fn get(&self, slot: usize) -> T {
        match &self.native {
            Some(buffer) => buffer[slot].clone(),
            None => self.storage.get(slot).ok()
                .and_then(|scalar| T::from_scalar(&scalar))
                .unwrap_or_else(T::missing),
        }
    }

    /// As [`get()`], but `None` if the element is missing.
    ///
    /// [`get()`]: Self::get
    #[inline]
    pub(crate) fn get_valid(&self, slot: usize) -> Option<T> {
        match &self.native {
            Some(buffer) => Some(&buffer[slot]).filter(|x| !x.is_missing()).cloned(),
            None => {
                let scalar = self.storage.get(slot).ok()?;
                if scalar.is_missing() { return None; }
                T::from_scalar(&scalar)
            },
        }
    }
}

/// The return type of [`NDArray::values()`].
pub struct Values<'a, T: Element> {
    reader: Reader<'a, T>,
    slots: Slots<'a>,
}

impl<'a, T: Element> Iterator for Values<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> { self.slots.next().map(|slot| self.reader.get(slot)) }

    fn size_hint(&self) -> (usize, Option<usize>) { self.slots.size_hint() }
}

impl<'a, T: Element> ExactSizeIterator for Values<'a, T> {}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> NDArray {
        NDArray::from_vec(&[3, 4], (0..12).map(|x| x as f64).collect()).unwrap()
    }

    #[test]
    fn access() {
        let a = grid();
        assert_eq!(a.get_double(&[2, 1]), Ok(9.0));
        assert_eq!(a.get_int(&[2, 1]), Ok(9));
        assert_eq!(a.get_flat::<f64>(5), Ok(5.0));
        assert!(a.get_double(&[3, 0]).is_err());
        assert!(a.get_flat::<f64>(12).is_err());
        a.set_int(&[0, 0], 7).unwrap();
        assert_eq!(a.get_double(&[0, 0]), Ok(7.0));
        a.set_flat(1, 2.5f32).unwrap();
        assert_eq!(a.get_double(&[0, 1]), Ok(2.5));
        assert_eq!(a.get_object(&[0, 1]), Ok(Scalar::Double(2.5)));
    }

    #[test]
    fn narrowing_and_missing() {
        let a = NDArray::zeros(DataType::Short, &[2]);
        a.set_double(&[0], f64::NAN).unwrap();
        a.set_double(&[1], -3.7).unwrap();
        assert_eq!(a.get_short(&[0]), Ok(i16::MIN));
        assert!(a.get_double(&[0]).unwrap().is_nan());
        assert_eq!(a.get_short(&[1]), Ok(-3));
        assert!(a.set_string(&[1], "gust".to_owned()).is_err());
    }

    #[test]
    fn out_of_range_floats_saturate() {
        let a = NDArray::zeros(DataType::Int, &[4]);
        for (i, x) in [3e9, f64::INFINITY, -3e9, f64::NEG_INFINITY].into_iter().enumerate() {
            a.set_double(&[i], x).unwrap();
        }
        assert_eq!(a.to_vec::<i32>(), vec![i32::MAX, i32::MAX, i32::MIN + 1, i32::MIN + 1]);
        assert!(!a.get_double(&[2]).unwrap().is_nan());

        let b = NDArray::from_vec(&[3], vec![200.0, -200.0, f64::NAN]).unwrap();
        assert_eq!(b.astype(DataType::Byte).unwrap().to_vec::<i8>(), vec![127, -127, i8::MIN]);
        let c = NDArray::zeros(DataType::Short, &[2]);
        c.fill(1e6).unwrap();
        assert_eq!(c.to_vec::<i16>(), vec![i16::MAX, i16::MAX]);
    }

    #[test]
    fn dates() {
        let a = NDArray::zeros(DataType::Date, &[2]);
        a.set_date(&[1], Date(86_400_000)).unwrap();
        assert_eq!(a.get_date(&[1]), Ok(Date(86_400_000)));
        assert_eq!(a.get_long(&[1]), Ok(86_400_000));
        assert!(a.set_date(&[2], Date(0)).is_err());
    }

    #[test]
    fn section_aliases_copy_does_not() {
        let a = grid();
        let ranges = [Range::new(1, 2), Range::with_stride(1, 3, 2)];
        let section = a.section(&ranges).unwrap();
        let copy = section.copy();

        let mut expected = vec![];
        for i in ranges[0].iter() {
            for j in ranges[1].iter() { expected.push(a.get_double(&[i, j]).unwrap()); }
        }
        assert_eq!(copy.to_vec::<f64>(), expected);
        assert!(copy.is_fast());
        assert!(!copy.shares_storage(&a));

        copy.set_double(&[0, 0], -1.0).unwrap();
        assert_eq!(a.get_double(&[1, 1]), Ok(5.0));
        section.set_double(&[0, 0], -1.0).unwrap();
        assert_eq!(a.get_double(&[1, 1]), Ok(-1.0));
    }

    #[test]
    fn views() {
        let a = grid();
        assert_eq!(a.slice(0, 1).unwrap().to_vec::<f64>(), vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(a.slice(1, 3).unwrap().to_vec::<i32>(), vec![3, 7, 11]);
        assert_eq!(a.flip(0).unwrap().slice(1, 0).unwrap().to_vec::<i32>(), vec![8, 4, 0]);
        let t = a.transpose(0, 1).unwrap();
        assert_eq!(t.shape(), &[4, 3]);
        assert_eq!(t.get_double(&[3, 2]), Ok(11.0));
        assert!(a.section(&[Range::new(0, 3), Range::full(4)]).is_err());
    }

    #[test]
    fn reshape() {
        let a = grid();
        let r = a.reshape(&[2, 6]).unwrap();
        assert!(r.shares_storage(&a));
        assert_eq!(r.get_double(&[1, 0]), Ok(6.0));
        let t = a.transpose(0, 1).unwrap().reshape(&[12]).unwrap();
        assert!(!t.shares_storage(&a));
        assert_eq!(t.to_vec::<i32>()[..4], [0, 4, 8, 1]);
        assert!(a.reshape(&[5]).is_err());
    }

    #[test]
    fn astype_and_assign() {
        let a = NDArray::from_vec(&[3], vec![1.5f64, f64::NAN, -2.5]).unwrap();
        let b = a.astype(DataType::Int).unwrap();
        assert_eq!(b.data_type(), DataType::Int);
        assert_eq!(b.to_vec::<i32>(), vec![1, i32::MIN, -2]);
        let s = NDArray::from_vec(&[1], vec!["x".to_owned()]).unwrap();
        assert!(s.astype(DataType::Double).is_err());

        let grid = grid();
        let row = grid.slice(0, 0).unwrap();
        row.assign(&grid.slice(0, 2).unwrap()).unwrap();
        assert_eq!(grid.slice(0, 0).unwrap().to_vec::<i32>(), vec![8, 9, 10, 11]);
        // Overlapping source and destination.
        let middle = grid.slice(0, 1).unwrap();
        middle.assign(&middle.flip(0).unwrap()).unwrap();
        assert_eq!(middle.to_vec::<i32>(), vec![7, 6, 5, 4]);
        assert!(row.assign(&grid.slice(1, 0).unwrap()).is_err());
    }

    #[test]
    fn from_storage() {
        let storage = Storage::from_vec(vec![1i64, 2, 3, 4, 5]);
        let a = NDArray::from_storage(&[2, 2], storage.clone()).unwrap();
        assert_eq!(a.get_long(&[1, 1]), Ok(4));
        assert!(NDArray::from_storage(&[2, 3], storage).is_err());
        let s = NDArray::scalar(2.5f32);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.data_type(), DataType::Float);
        assert_eq!(s.get_double(&[]), Ok(2.5));
    }

    #[test]
    fn valid_values() {
        let a = NDArray::from_vec(&[4], vec![1, i32::MIN, 3, 4]).unwrap();
        let valid: Vec<(usize, f64)> = a.valid_values().collect();
        assert_eq!(valid, vec![(0, 1.0), (2, 3.0), (3, 4.0)]);
    }
}
