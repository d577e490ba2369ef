//! Sequential access to the elements of an array.

use num_complex::Complex64;

use super::element::Element;
use super::index::Counter;
use super::{Date, Error, NDArray, Result, Scalar};

/// Visits the elements of an [`NDArray`] one at a time in row-major order,
/// whether or not the array is contiguous.
///
/// A new cursor is positioned before the first element. [`advance()`] moves
/// to the next one, after which [`get()`] and [`set()`] act on it.
///
/// ```
/// use meteoarray::NDArray;
/// let a = NDArray::from_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let t = a.transpose(0, 1).unwrap();
/// let mut cursor = t.cursor();
/// let mut seen = vec![];
/// while cursor.has_next() {
///     let x = cursor.get_double_next().unwrap();
///     seen.push(x);
///     cursor.set(x * 10.0).unwrap();
/// }
/// assert_eq!(seen, vec![1.0, 3.0, 2.0, 4.0]);
/// assert_eq!(a.to_vec::<f64>(), vec![10.0, 20.0, 30.0, 40.0]);
/// ```
///
/// [`advance()`]: Self::advance
/// [`get()`]: Self::get
/// [`set()`]: Self::set
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    array: &'a NDArray,
    counter: Counter,
    /// The number of elements visited so far, including the current one.
    visited: usize,
    exhausted: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(array: &'a NDArray) -> Self {
        Cursor { array, counter: Counter::new(array.shape()), visited: 0, exhausted: false }
    }

    /// Returns `true` if [`advance()`] would move to an element.
    ///
    /// [`advance()`]: Self::advance
    pub fn has_next(&self) -> bool { self.visited < self.array.size() }

    /// Moves to the next element. Returns `false`, and leaves the cursor
    /// exhausted, if there is none.
    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            self.exhausted = true;
            return false;
        }
        if self.visited > 0 { self.counter.increment(); }
        self.visited += 1;
        true
    }

    /// Returns `true` once [`advance()`] has run past the last element.
    ///
    /// [`advance()`]: Self::advance
    pub fn exhausted(&self) -> bool { self.exhausted }

    /// The coordinate of the current element, if any.
    pub fn coordinate(&self) -> Option<&[usize]> {
        if self.visited == 0 || self.exhausted { None } else { self.counter.current() }
    }

    /// The row-major position of the current element, if any.
    pub fn position(&self) -> Option<usize> {
        if self.visited == 0 || self.exhausted { None } else { Some(self.visited - 1) }
    }

    fn here(&self) -> Result<&[usize]> {
        self.coordinate().ok_or_else(|| Error::IndexOutOfRange {
            index: vec![self.visited],
            shape: self.array.shape().into(),
        })
    }

    /// The current element in its own type.
    pub fn current(&self) -> Result<Scalar> { self.get() }

    /// Reads the current element as a `T`.
    pub fn get<T: Element>(&self) -> Result<T> { self.array.get(self.here()?) }

    /// Converts `value` to the array's type and writes it to the current
    /// element.
    pub fn set<T: Element>(&self, value: T) -> Result<()> { self.array.set(self.here()?, value) }

    /// Advances, then reads the new current element.
    pub fn get_next<T: Element>(&mut self) -> Result<T> {
        self.advance();
        self.get()
    }

    /// Advances, then writes the new current element.
    pub fn set_next<T: Element>(&mut self, value: T) -> Result<()> {
        self.advance();
        self.set(value)
    }
}

macro_rules! typed_next {
    ($($ty:ty: $get:ident, $set:ident;)*) => {
        /// Typed forms of `get_next()` and `set_next()`.
        impl<'a> Cursor<'a> {
            $(
                pub fn $get(&mut self) -> Result<$ty> { self.get_next() }
                pub fn $set(&mut self, value: $ty) -> Result<()> { self.set_next(value) }
            )*
        }
    };
}

typed_next! {
    i8: get_byte_next, set_byte_next;
    i16: get_short_next, set_short_next;
    i32: get_int_next, set_int_next;
    i64: get_long_next, set_long_next;
    f32: get_float_next, set_float_next;
    f64: get_double_next, set_double_next;
    bool: get_boolean_next, set_boolean_next;
    Complex64: get_complex_next, set_complex_next;
    String: get_string_next, set_string_next;
    Date: get_date_next, set_date_next;
    Scalar: get_object_next, set_object_next;
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataType, Range};

    #[test]
    fn walks_a_section() {
        let a = NDArray::from_vec(&[3, 3], (0..9).collect::<Vec<i32>>()).unwrap();
        let s = a.section(&[Range::new(1, 2), Range::new(0, 1)]).unwrap();
        let mut cursor = s.cursor();
        assert_eq!(cursor.coordinate(), None);
        let mut seen = vec![];
        while cursor.advance() {
            seen.push((cursor.position().unwrap(), cursor.get::<i32>().unwrap()));
        }
        assert_eq!(seen, vec![(0, 3), (1, 4), (2, 6), (3, 7)]);
        assert!(cursor.exhausted());
        assert!(cursor.get::<i32>().is_err());
        assert!(cursor.current().is_err());
    }

    #[test]
    fn set_next() {
        let a = NDArray::zeros(DataType::Long, &[3]);
        let mut cursor = a.cursor();
        for x in [5, 6, 7] { cursor.set_int_next(x).unwrap(); }
        assert!(!cursor.has_next());
        assert!(cursor.set_int_next(8).is_err());
        assert_eq!(a.to_vec::<i64>(), vec![5, 6, 7]);
    }

    #[test]
    fn typed_next() {
        let words = NDArray::zeros(DataType::String, &[2]);
        let mut cursor = words.cursor();
        cursor.set_string_next("fog".to_owned()).unwrap();
        cursor.set_string_next("haze".to_owned()).unwrap();
        assert_eq!(words.to_vec::<String>(), vec!["fog", "haze"]);

        let dates = NDArray::zeros(DataType::Date, &[2]);
        let mut cursor = dates.cursor();
        cursor.set_date_next(Date(1_000)).unwrap();
        cursor.set_long_next(2_000).unwrap();
        let mut cursor = dates.cursor();
        assert_eq!(cursor.get_date_next(), Ok(Date(1_000)));
        assert_eq!(cursor.get_object_next(), Ok(Scalar::Date(Date(2_000))));

        let flags = NDArray::from_vec(&[2], vec![true, false]).unwrap();
        let mut cursor = flags.cursor();
        assert_eq!(cursor.get_boolean_next(), Ok(true));
        assert_eq!(cursor.get_byte_next(), Ok(0));
    }

    #[test]
    fn empty_and_rank_zero() {
        let empty = NDArray::zeros(DataType::Double, &[0, 4]);
        let mut cursor = empty.cursor();
        assert!(!cursor.has_next());
        assert!(!cursor.advance());
        assert!(cursor.exhausted());

        let scalar = NDArray::scalar(1.5);
        let mut cursor = scalar.cursor();
        assert_eq!(cursor.get_double_next(), Ok(1.5));
        assert_eq!(cursor.current(), Ok(Scalar::Double(1.5)));
        assert!(!cursor.has_next());
    }
}
