//! Reference-counted element buffers.

use std::cell::RefCell;
use std::rc::Rc;

use super::element::{with_element, Element};
use super::{DataType, Date, Error, Result, Scalar, Shape};
use num_complex::Complex64;

/// A buffer shared between an array and all of its views.
pub type Buffer<T> = Rc<RefCell<Vec<T>>>;

/// The elements behind one or more [`NDArray`]s, tagged by [`DataType`].
///
/// Cloning a `Storage` clones the handle, not the elements.
///
/// [`NDArray`]: super::NDArray
#[derive(Debug, Clone)]
pub enum Storage {
    Byte(Buffer<i8>),
    Short(Buffer<i16>),
    Int(Buffer<i32>),
    Long(Buffer<i64>),
    Float(Buffer<f32>),
    Double(Buffer<f64>),
    Boolean(Buffer<bool>),
    Complex(Buffer<Complex64>),
    String(Buffer<String>),
    Date(Buffer<Date>),
    Object(Buffer<Scalar>),
}

/// Evaluates `$body` with `$buffer` bound to the typed buffer of `$storage`.
macro_rules! for_each_storage {
    ($storage:expr, $buffer:ident => $body:expr) => {
        match $storage {
            Storage::Byte($buffer) => $body,
            Storage::Short($buffer) => $body,
            Storage::Int($buffer) => $body,
            Storage::Long($buffer) => $body,
            Storage::Float($buffer) => $body,
            Storage::Double($buffer) => $body,
            Storage::Boolean($buffer) => $body,
            Storage::Complex($buffer) => $body,
            Storage::String($buffer) => $body,
            Storage::Date($buffer) => $body,
            Storage::Object($buffer) => $body,
        }
    };
}

impl Storage {
    /// Allocates `len` elements of type `data_type`, all [`Element::zero()`].
    pub fn zeros(data_type: DataType, len: usize) -> Self {
        with_element!(data_type, T => T::into_storage(vec![T::zero(); len]))
    }

    pub fn from_vec<T: Element>(values: Vec<T>) -> Self { T::into_storage(values) }

    /// A one-element storage holding `value` in its own type.
    pub fn from_scalar(value: Scalar) -> Self {
        with_element!(value.data_type(), T => {
            T::into_storage(vec![T::from_scalar(&value).unwrap_or_else(T::missing)])
        })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Storage::Byte(_) => DataType::Byte,
            Storage::Short(_) => DataType::Short,
            Storage::Int(_) => DataType::Int,
            Storage::Long(_) => DataType::Long,
            Storage::Float(_) => DataType::Float,
            Storage::Double(_) => DataType::Double,
            Storage::Boolean(_) => DataType::Boolean,
            Storage::Complex(_) => DataType::Complex,
            Storage::String(_) => DataType::String,
            Storage::Date(_) => DataType::Date,
            Storage::Object(_) => DataType::Object,
        }
    }

    pub fn len(&self) -> usize { for_each_storage!(self, buffer => buffer.borrow().len()) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns `true` if `self` and `other` are handles to the same elements.
    pub fn ptr_eq(&self, other: &Storage) -> bool { self.as_ptr() == other.as_ptr() }

    fn as_ptr(&self) -> *const u8 {
        for_each_storage!(self, buffer => Rc::as_ptr(buffer) as *const u8)
    }

    /// Reads the element at `slot`.
    pub fn get(&self, slot: usize) -> Result<Scalar> {
        for_each_storage!(self, buffer => {
            let buffer = buffer.borrow();
            let value = buffer.get(slot).cloned().map(Element::into_scalar);
            value.ok_or_else(|| out_of_range(slot, buffer.len()))
        })
    }

    /// Converts `value` to the element type and writes it at `slot`.
    pub fn set(&self, slot: usize, value: &Scalar) -> Result<()> {
        for_each_storage!(self, buffer => store(buffer, slot, value))
    }

    /// Copies the elements at `slots`, in order, into new storage.
    pub(crate) fn gather(&self, slots: impl Iterator<Item = usize>) -> Storage {
        for_each_storage!(self, buffer => {
            let buffer = buffer.borrow();
            let values: Vec<_> = slots.map(|slot| buffer[slot].clone()).collect();
            Element::into_storage(values)
        })
    }
}

fn out_of_range(slot: usize, len: usize) -> Error {
    Error::IndexOutOfRange { index: vec![slot], shape: Shape::from_slice(&[len]) }
}

fn store<T: Element>(buffer: &Buffer<T>, slot: usize, value: &Scalar) -> Result<()> {
    let value = T::from_scalar(value).ok_or_else(|| Error::unsupported("store", value.data_type()))?;
    let mut buffer = buffer.borrow_mut();
    let len = buffer.len();
    let element = buffer.get_mut(slot).ok_or_else(|| out_of_range(slot, len))?;
    *element = value;
    Ok(())
}

// ----------------------------------------------------------------------------
