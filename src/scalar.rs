//! Dynamically typed single values.
//!
//! A [`Scalar`] is what the typed accessors of an [`NDArray`] convert
//! through, what a rank-0 operand is built from, and what an array of
//! [`DataType::Object`] stores.
//!
//! [`NDArray`]: super::NDArray

use std::fmt::{self, Display};

use num_complex::Complex64;

use super::DataType;

/// An instant, in milliseconds since the Unix epoch.
///
/// Converting dates to and from calendar representations is left to callers.
/// `Date(i64::MIN)` is the missing marker.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(pub i64);

/// A single value of any [`DataType`] except `Object`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Complex(Complex64),
    String(String),
    Date(Date),
}

impl Scalar {
    /// The scalar used to represent "no value" when no better type is known.
    pub const MISSING: Scalar = Scalar::Double(f64::NAN);

    pub fn data_type(&self) -> DataType {
        match self {
            Scalar::Byte(_) => DataType::Byte,
            Scalar::Short(_) => DataType::Short,
            Scalar::Int(_) => DataType::Int,
            Scalar::Long(_) => DataType::Long,
            Scalar::Float(_) => DataType::Float,
            Scalar::Double(_) => DataType::Double,
            Scalar::Boolean(_) => DataType::Boolean,
            Scalar::Complex(_) => DataType::Complex,
            Scalar::String(_) => DataType::String,
            Scalar::Date(_) => DataType::Date,
        }
    }

    /// Returns `true` if this is the missing-value marker of its type.
    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Byte(x) => *x == i8::MIN,
            Scalar::Short(x) => *x == i16::MIN,
            Scalar::Int(x) => *x == i32::MIN,
            Scalar::Long(x) => *x == i64::MIN,
            Scalar::Float(x) => x.is_nan(),
            Scalar::Double(x) => x.is_nan(),
            Scalar::Complex(z) => z.is_nan(),
            Scalar::Date(d) => d.0 == i64::MIN,
            Scalar::Boolean(_) | Scalar::String(_) => false,
        }
    }

    /// Reads this value as an `i64`.
    ///
    /// Floats truncate toward zero and saturate. Complex values lose their
    /// imaginary part. Strings are parsed. Missing values are not special
    /// here; callers check [`is_missing()`] first.
    ///
    /// [`is_missing()`]: Self::is_missing
    pub fn to_i64(&self) -> Option<i64> {
        Some(match self {
            Scalar::Byte(x) => *x as i64,
            Scalar::Short(x) => *x as i64,
            Scalar::Int(x) => *x as i64,
            Scalar::Long(x) => *x,
            Scalar::Float(x) => *x as i64,
            Scalar::Double(x) => *x as i64,
            Scalar::Boolean(x) => *x as i64,
            Scalar::Complex(z) => z.re as i64,
            Scalar::String(s) => return s.trim().parse::<i64>().ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|x| x as i64)),
            Scalar::Date(d) => d.0,
        })
    }

    /// Reads this value as an `f64`. Missing integers become NaN.
    pub fn to_f64(&self) -> Option<f64> {
        if self.is_missing() { return Some(f64::NAN); }
        Some(match self {
            Scalar::Byte(x) => *x as f64,
            Scalar::Short(x) => *x as f64,
            Scalar::Int(x) => *x as f64,
            Scalar::Long(x) => *x as f64,
            Scalar::Float(x) => *x as f64,
            Scalar::Double(x) => *x,
            Scalar::Boolean(x) => if *x { 1.0 } else { 0.0 },
            Scalar::Complex(z) => z.re,
            Scalar::String(s) => return s.trim().parse::<f64>().ok(),
            Scalar::Date(d) => d.0 as f64,
        })
    }

    /// Reads this value as a complex number. Missing values become NaN.
    pub fn to_complex(&self) -> Option<Complex64> {
        match self {
            Scalar::Complex(z) => Some(*z),
            _ => self.to_f64().map(|re| Complex64::new(re, 0.0)),
        }
    }

    /// Reads this value as a `bool`: numbers are `true` when non-zero.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(x) => Some(*x),
            Scalar::Complex(z) => Some(z.re != 0.0 || z.im != 0.0),
            Scalar::String(s) => s.trim().parse().ok(),
            _ => self.to_f64().map(|x| x != 0.0),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Byte(x) => write!(f, "{x}"),
            Scalar::Short(x) => write!(f, "{x}"),
            Scalar::Int(x) => write!(f, "{x}"),
            Scalar::Long(x) => write!(f, "{x}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Double(x) => write!(f, "{x}"),
            Scalar::Boolean(x) => write!(f, "{x}"),
            Scalar::Complex(z) => write!(f, "{z}"),
            Scalar::String(s) => f.write_str(s),
            Scalar::Date(d) => write!(f, "{}", d.0),
        }
    }
}

macro_rules! impl_from_for_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self { Scalar::$variant(value) }
        }
    };
}

impl_from_for_scalar!(i8, Byte);
impl_from_for_scalar!(i16, Short);
impl_from_for_scalar!(i32, Int);
impl_from_for_scalar!(i64, Long);
impl_from_for_scalar!(f32, Float);
impl_from_for_scalar!(f64, Double);
impl_from_for_scalar!(bool, Boolean);
impl_from_for_scalar!(Complex64, Complex);
impl_from_for_scalar!(String, String);
impl_from_for_scalar!(Date, Date);

impl From<&str> for Scalar {
    fn from(value: &str) -> Self { Scalar::String(value.to_owned()) }
}

// ----------------------------------------------------------------------------
