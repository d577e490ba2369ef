//! The closed set of native element representations.
//!
//! Every [`DataType`] has exactly one Rust type that stores its elements, and
//! that type implements [`Element`]. Kernels are written once, generically
//! over `T: Element`, and [`with_element!`] picks the instantiation from a
//! run-time `DataType`.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use num_complex::Complex64;

use super::ops::{Arithmetic, Bitwise, Comparison, Integer, Unary};
use super::storage::{Buffer, Storage};
use super::{DataType, Date, Error, Result, Scalar};

/// Implemented by the Rust type of each [`DataType`].
///
/// The operator hooks receive operands that are not missing. Their default
/// implementations report that the operator is undefined for this type.
pub trait Element: Clone + Debug + 'static {
    const DATA_TYPE: DataType;

    /// The value of a freshly allocated element.
    fn zero() -> Self;

    /// The missing-value marker, or [`zero()`] for types that have none.
    ///
    /// [`zero()`]: Self::zero
    fn missing() -> Self;

    fn is_missing(&self) -> bool;

    fn into_scalar(self) -> Scalar;

    /// Converts `scalar` to this type. A missing `scalar` becomes
    /// [`missing()`]. Returns `None` if there is no conversion.
    ///
    /// [`missing()`]: Self::missing
    fn from_scalar(scalar: &Scalar) -> Option<Self>;

    /// Returns the typed buffer if `storage` holds elements of this type.
    fn buffer(storage: &Storage) -> Option<&Buffer<Self>>;

    fn into_storage(values: Vec<Self>) -> Storage;

    fn arithmetic<A: Arithmetic>(_a: Self, _b: Self) -> Result<Self> {
        Err(Error::unsupported(A::NAME, Self::DATA_TYPE))
    }

    fn compare<C: Comparison>(_a: &Self, _b: &Self) -> Result<bool> {
        Err(Error::unsupported(C::NAME, Self::DATA_TYPE))
    }

    fn bitwise<B: Bitwise>(_a: Self, _b: Self) -> Result<Self> {
        Err(Error::unsupported(B::NAME, Self::DATA_TYPE))
    }

    fn unary<U: Unary>(_x: Self) -> Result<Self> {
        Err(Error::unsupported(U::NAME, Self::DATA_TYPE))
    }
}

/// Evaluates `$body` with `$t` bound to the [`Element`] type of `$data_type`.
///
/// ```ignore
/// let storage = with_element!(data_type, T => T::into_storage(vec![T::zero(); 10]));
/// ```
macro_rules! with_element {
    ($data_type:expr, $t:ident => $body:expr) => {
        match $data_type {
            $crate::DataType::Byte => { type $t = i8; $body },
            $crate::DataType::Short => { type $t = i16; $body },
            $crate::DataType::Int => { type $t = i32; $body },
            $crate::DataType::Long => { type $t = i64; $body },
            $crate::DataType::Float => { type $t = f32; $body },
            $crate::DataType::Double => { type $t = f64; $body },
            $crate::DataType::Boolean => { type $t = bool; $body },
            $crate::DataType::Complex => { type $t = ::num_complex::Complex64; $body },
            $crate::DataType::String => { type $t = ::std::string::String; $body },
            $crate::DataType::Date => { type $t = $crate::Date; $body },
            $crate::DataType::Object => { type $t = $crate::Scalar; $body },
        }
    };
}

pub(crate) use with_element;

/// Converts `scalar` to `T`, reporting `op` if there is no conversion.
pub(crate) fn cast<T: Element>(scalar: &Scalar, op: &'static str) -> Result<T> {
    T::from_scalar(scalar).ok_or_else(|| Error::unsupported(op, scalar.data_type()))
}

fn new_buffer<T>(values: Vec<T>) -> Buffer<T> { Rc::new(RefCell::new(values)) }

/// Converts a non-missing float to an integer type, truncating toward zero
/// and saturating. The result stays above `MIN`, which is the missing marker.
fn saturate<T: Integer>(x: f64) -> T {
    let (low, high) = (T::min_value() + T::one(), T::max_value());
    match num_traits::cast::<f64, T>(x.trunc()) {
        Some(value) => num_traits::clamp(value, low, high),
        None => if x > 0.0 { high } else { low },
    }
}

// ----------------------------------------------------------------------------

macro_rules! impl_integer_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$variant;
            fn zero() -> Self { 0 }
            fn missing() -> Self { <$ty>::MIN }
            fn is_missing(&self) -> bool { *self == <$ty>::MIN }
            fn into_scalar(self) -> Scalar { Scalar::$variant(self) }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                if scalar.is_missing() { return Some(<$ty>::MIN); }
                match scalar {
                    Scalar::Float(_) | Scalar::Double(_) | Scalar::Complex(_) => {
                        scalar.to_f64().map(saturate)
                    },
                    Scalar::String(s) if s.trim().parse::<i64>().is_err() => {
                        scalar.to_f64().map(saturate)
                    },
                    // Integer narrowing wraps.
                    _ => scalar.to_i64().map(|x| x as $ty),
                }
            }

            fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
                if let Storage::$variant(buffer) = storage { Some(buffer) } else { None }
            }

            fn into_storage(values: Vec<Self>) -> Storage { Storage::$variant(new_buffer(values)) }

            fn arithmetic<A: Arithmetic>(a: Self, b: Self) -> Result<Self> {
                Ok(A::integer(a, b).unwrap_or(<$ty>::MIN))
            }

            fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
                Ok(C::ordering(a.partial_cmp(b)))
            }

            fn bitwise<B: Bitwise>(a: Self, b: Self) -> Result<Self> {
                Ok(B::integer(a, b).unwrap_or(<$ty>::MIN))
            }

            fn unary<U: Unary>(x: Self) -> Result<Self> {
                U::integer(x).ok_or_else(|| Error::unsupported(U::NAME, Self::DATA_TYPE))
            }
        }
    };
}

impl_integer_element!(i8, Byte);
impl_integer_element!(i16, Short);
impl_integer_element!(i32, Int);
impl_integer_element!(i64, Long);

macro_rules! impl_float_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$variant;
            fn zero() -> Self { 0.0 }
            fn missing() -> Self { <$ty>::NAN }
            fn is_missing(&self) -> bool { self.is_nan() }
            fn into_scalar(self) -> Scalar { Scalar::$variant(self) }
            fn from_scalar(scalar: &Scalar) -> Option<Self> { scalar.to_f64().map(|x| x as $ty) }

            fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
                if let Storage::$variant(buffer) = storage { Some(buffer) } else { None }
            }

            fn into_storage(values: Vec<Self>) -> Storage { Storage::$variant(new_buffer(values)) }

            #[inline(always)]
            fn arithmetic<A: Arithmetic>(a: Self, b: Self) -> Result<Self> { Ok(A::real(a, b)) }

            #[inline(always)]
            fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
                Ok(C::ordering(a.partial_cmp(b)))
            }

            fn unary<U: Unary>(x: Self) -> Result<Self> { Ok(U::real(x)) }
        }
    };
}

impl_float_element!(f32, Float);
impl_float_element!(f64, Double);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Boolean;
    fn zero() -> Self { false }
    fn missing() -> Self { false }
    fn is_missing(&self) -> bool { false }
    fn into_scalar(self) -> Scalar { Scalar::Boolean(self) }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        // No marker to convert to: missing reads as `false`.
        if scalar.is_missing() { return Some(false); }
        scalar.to_bool()
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        if let Storage::Boolean(buffer) = storage { Some(buffer) } else { None }
    }

    fn into_storage(values: Vec<Self>) -> Storage { Storage::Boolean(new_buffer(values)) }

    fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
        Ok(C::ordering(a.partial_cmp(b)))
    }

    fn bitwise<B: Bitwise>(a: Self, b: Self) -> Result<Self> {
        B::boolean(a, b).ok_or_else(|| Error::unsupported(B::NAME, Self::DATA_TYPE))
    }

    fn unary<U: Unary>(x: Self) -> Result<Self> {
        U::boolean(x).ok_or_else(|| Error::unsupported(U::NAME, Self::DATA_TYPE))
    }
}

impl Element for Complex64 {
    const DATA_TYPE: DataType = DataType::Complex;
    fn zero() -> Self { Complex64::new(0.0, 0.0) }
    fn missing() -> Self { Complex64::new(f64::NAN, f64::NAN) }
    fn is_missing(&self) -> bool { self.is_nan() }
    fn into_scalar(self) -> Scalar { Scalar::Complex(self) }
    fn from_scalar(scalar: &Scalar) -> Option<Self> { scalar.to_complex() }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        if let Storage::Complex(buffer) = storage { Some(buffer) } else { None }
    }

    fn into_storage(values: Vec<Self>) -> Storage { Storage::Complex(new_buffer(values)) }

    fn arithmetic<A: Arithmetic>(a: Self, b: Self) -> Result<Self> {
        A::complex(a, b).ok_or_else(|| Error::unsupported(A::NAME, Self::DATA_TYPE))
    }

    fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
        C::equality(a == b).ok_or_else(|| Error::unsupported(C::NAME, Self::DATA_TYPE))
    }

    fn unary<U: Unary>(x: Self) -> Result<Self> {
        U::complex(x).ok_or_else(|| Error::unsupported(U::NAME, Self::DATA_TYPE))
    }
}

impl Element for String {
    const DATA_TYPE: DataType = DataType::String;
    fn zero() -> Self { String::new() }
    fn missing() -> Self { String::new() }
    fn is_missing(&self) -> bool { false }
    fn into_scalar(self) -> Scalar { Scalar::String(self) }
    fn from_scalar(scalar: &Scalar) -> Option<Self> { Some(scalar.to_string()) }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        if let Storage::String(buffer) = storage { Some(buffer) } else { None }
    }

    fn into_storage(values: Vec<Self>) -> Storage { Storage::String(new_buffer(values)) }

    fn arithmetic<A: Arithmetic>(a: Self, b: Self) -> Result<Self> {
        A::string(&a, &b).ok_or_else(|| Error::unsupported(A::NAME, Self::DATA_TYPE))
    }

    fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
        Ok(C::ordering(a.partial_cmp(b)))
    }
}

impl Element for Date {
    const DATA_TYPE: DataType = DataType::Date;
    fn zero() -> Self { Date(0) }
    fn missing() -> Self { Date(i64::MIN) }
    fn is_missing(&self) -> bool { self.0 == i64::MIN }
    fn into_scalar(self) -> Scalar { Scalar::Date(self) }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Date(date) => Some(*date),
            s if s.is_missing() => Some(Date(i64::MIN)),
            s if s.data_type().is_integer() => s.to_i64().map(Date),
            _ => None,
        }
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        if let Storage::Date(buffer) = storage { Some(buffer) } else { None }
    }

    fn into_storage(values: Vec<Self>) -> Storage { Storage::Date(new_buffer(values)) }

    fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
        Ok(C::ordering(a.partial_cmp(b)))
    }
}

/// Object arrays apply each operator to the common type of the two scalars
/// in hand, so the rules are exactly those of the native types.
impl Element for Scalar {
    const DATA_TYPE: DataType = DataType::Object;
    fn zero() -> Self { Scalar::Int(0) }
    fn missing() -> Self { Scalar::MISSING }
    fn is_missing(&self) -> bool { Scalar::is_missing(self) }
    fn into_scalar(self) -> Scalar { self }
    fn from_scalar(scalar: &Scalar) -> Option<Self> { Some(scalar.clone()) }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        if let Storage::Object(buffer) = storage { Some(buffer) } else { None }
    }

    fn into_storage(values: Vec<Self>) -> Storage { Storage::Object(new_buffer(values)) }

    fn arithmetic<A: Arithmetic>(a: Self, b: Self) -> Result<Self> {
        let data_type = inner_type(&a, &b, A::NAME)?;
        with_element!(data_type, T => {
            let (x, y) = (cast::<T>(&a, A::NAME)?, cast::<T>(&b, A::NAME)?);
            if x.is_missing() || y.is_missing() { return Ok(T::missing().into_scalar()); }
            T::arithmetic::<A>(x, y).map(T::into_scalar)
        })
    }

    fn compare<C: Comparison>(a: &Self, b: &Self) -> Result<bool> {
        let data_type = inner_type(a, b, C::NAME)?;
        with_element!(data_type, T => {
            let (x, y) = (cast::<T>(a, C::NAME)?, cast::<T>(b, C::NAME)?);
            if x.is_missing() || y.is_missing() { return Ok(C::ordering(None)); }
            T::compare::<C>(&x, &y)
        })
    }

    fn bitwise<B: Bitwise>(a: Self, b: Self) -> Result<Self> {
        let data_type = inner_type(&a, &b, B::NAME)?;
        with_element!(data_type, T => {
            let (x, y) = (cast::<T>(&a, B::NAME)?, cast::<T>(&b, B::NAME)?);
            if x.is_missing() || y.is_missing() { return Ok(T::missing().into_scalar()); }
            T::bitwise::<B>(x, y).map(T::into_scalar)
        })
    }

    fn unary<U: Unary>(x: Self) -> Result<Self> {
        let data_type = x.data_type();
        let result_type = U::result_type(data_type)
            .ok_or_else(|| Error::unsupported(U::NAME, data_type))?;
        if let (Scalar::Complex(z), false) = (&x, result_type == DataType::Complex) {
            if z.is_nan() { return Ok(Scalar::MISSING); }
            return U::complex_to_real(*z).map(Scalar::Double)
                .ok_or_else(|| Error::unsupported(U::NAME, data_type));
        }
        with_element!(result_type, T => {
            let value = cast::<T>(&x, U::NAME)?;
            if value.is_missing() { return Ok(T::missing().into_scalar()); }
            T::unary::<U>(value).map(T::into_scalar)
        })
    }
}

/// The common type of two object elements, which must itself be native.
fn inner_type(a: &Scalar, b: &Scalar, op: &'static str) -> Result<DataType> {
    match a.data_type().common_type(b.data_type()) {
        DataType::Object => Err(Error::unsupported(op, DataType::Object)),
        data_type => Ok(data_type),
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;

    #[test]
    fn markers() {
        assert!(i16::missing().is_missing());
        assert!(f32::missing().is_missing());
        assert!(Complex64::missing().is_missing());
        assert!(Date::missing().is_missing());
        assert!(!bool::missing().is_missing());
        assert_eq!(i32::from_scalar(&Scalar::Double(f64::NAN)), Some(i32::MIN));
        assert!(f64::from_scalar(&Scalar::Long(i64::MIN)).unwrap().is_nan());
    }

    #[test]
    fn conversions() {
        assert_eq!(i8::from_scalar(&Scalar::Int(300)), Some(44));
        assert_eq!(i32::from_scalar(&Scalar::Double(-2.9)), Some(-2));
        assert_eq!(bool::from_scalar(&Scalar::Float(0.5)), Some(true));
        assert_eq!(Date::from_scalar(&Scalar::Long(86_400_000)), Some(Date(86_400_000)));
        assert_eq!(Date::from_scalar(&Scalar::Double(1.0)), None);
        assert_eq!(String::from_scalar(&Scalar::Short(12)), Some("12".to_owned()));
        assert_eq!(f64::from_scalar(&Scalar::from("n/a")), None);
    }

    #[test]
    fn floats_saturate_into_integers() {
        assert_eq!(i32::from_scalar(&Scalar::Double(3e9)), Some(i32::MAX));
        assert_eq!(i32::from_scalar(&Scalar::Double(f64::INFINITY)), Some(i32::MAX));
        assert_eq!(i32::from_scalar(&Scalar::Double(-3e9)), Some(i32::MIN + 1));
        assert_eq!(i32::from_scalar(&Scalar::Double(-2147483648.0)), Some(i32::MIN + 1));
        assert_eq!(i8::from_scalar(&Scalar::Float(200.0)), Some(127));
        assert_eq!(i16::from_scalar(&Scalar::from("1e9")), Some(i16::MAX));
        assert_eq!(i64::from_scalar(&Scalar::Double(-1e300)), Some(i64::MIN + 1));
        assert_eq!(i8::from_scalar(&Scalar::Double(-12.9)), Some(-12));
        // Integer sources still wrap.
        assert_eq!(i8::from_scalar(&Scalar::Long(200)), Some(-56));
    }

    #[test]
    fn integer_failures_become_missing() {
        assert_eq!(i32::arithmetic::<ops::Div>(5, 0), Ok(i32::MIN));
        assert_eq!(i64::arithmetic::<ops::Rem>(5, 3), Ok(2));
    }

    #[test]
    fn undefined_operators() {
        assert_eq!(
            bool::arithmetic::<ops::Add>(true, false),
            Err(Error::unsupported("add", DataType::Boolean)),
        );
        assert!(Complex64::arithmetic::<ops::Rem>(Complex64::zero(), Complex64::zero()).is_err());
        assert!(Complex64::compare::<ops::Less>(&Complex64::zero(), &Complex64::zero()).is_err());
        assert_eq!(Complex64::compare::<ops::Equal>(&Complex64::zero(), &Complex64::zero()), Ok(true));
        assert!(String::arithmetic::<ops::Sub>("a".into(), "b".into()).is_err());
        assert_eq!(String::arithmetic::<ops::Add>("500".into(), "hPa".into()), Ok("500hPa".into()));
        assert!(Date::arithmetic::<ops::Add>(Date(1), Date(2)).is_err());
    }

    #[test]
    fn objects_use_their_common_type() {
        let sum = Scalar::arithmetic::<ops::Add>(Scalar::Int(2), Scalar::Double(0.5));
        assert_eq!(sum, Ok(Scalar::Double(2.5)));
        let diff = Scalar::arithmetic::<ops::Sub>(Scalar::Int(2), Scalar::Complex(Complex64::new(1.0, 1.0)));
        assert_eq!(diff, Ok(Scalar::Complex(Complex64::new(1.0, -1.0))));
        let missing = Scalar::arithmetic::<ops::Mul>(Scalar::Int(i32::MIN), Scalar::Int(3));
        assert_eq!(missing, Ok(Scalar::Int(i32::MIN)));
        assert!(Scalar::arithmetic::<ops::Add>(Scalar::from("a"), Scalar::Int(1)).is_err());
        assert_eq!(Scalar::compare::<ops::Less>(&Scalar::Byte(1), &Scalar::Long(2)), Ok(true));
        assert_eq!(Scalar::unary::<ops::Abs>(Scalar::Complex(Complex64::new(3.0, 4.0))), Ok(Scalar::Double(5.0)));
        assert_eq!(Scalar::unary::<ops::Sqrt>(Scalar::Int(9)), Ok(Scalar::Double(3.0)));
    }
}
