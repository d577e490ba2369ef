//! Generic programming over elementwise operators.
//!
//! For each operator this module contains a type that cannot be instantiated
//! and that implements one of [`Arithmetic`], [`Comparison`], [`Bitwise`] or
//! [`Unary`]. For example, [`Add`] corresponds to [`std::ops::Add`]. These are
//! passed as type parameters to the dispatcher, e.g.
//! [`elementwise::arithmetic()`].
//!
//! Each trait has one method per family of element representations. The
//! dispatcher picks the family from the promoted [`DataType`], so a kernel
//! only ever sees two operands of the same representation. Missing operands
//! never reach a kernel.
//!
//! [`elementwise::arithmetic()`]: super::elementwise::arithmetic()

use std::cmp::Ordering;
use std::fmt::Debug;

use num_complex::Complex64;
use num_traits::{
    CheckedRem, Float, PrimInt, Signed, WrappingAdd, WrappingMul, WrappingNeg, WrappingShl,
    WrappingShr, WrappingSub,
};

use super::DataType;

/// The integer representations: `i8`, `i16`, `i32` and `i64`.
pub trait Integer:
    PrimInt + Signed + CheckedRem + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg
    + WrappingShl + WrappingShr + Debug
{}

impl<T> Integer for T where
    T: PrimInt + Signed + CheckedRem + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg
    + WrappingShl + WrappingShr + Debug
{}

// ----------------------------------------------------------------------------

/// A binary operator whose result has the same type as its operands.
///
/// This trait has no methods that take `self`. It makes sense to implement it
/// for types that cannot be instantiated, such as empty enumerations.
pub trait Arithmetic {
    /// The name used in error messages.
    const NAME: &'static str;

    /// Integer arithmetic. Returns `None` when the result is undefined (e.g.
    /// division by zero), which the dispatcher stores as a missing value.
    fn integer<T: Integer>(a: T, b: T) -> Option<T>;

    /// Floating-point arithmetic, with IEEE semantics.
    fn real<T: Float>(a: T, b: T) -> T;

    /// Returns `None` if the operator is not defined for complex numbers.
    fn complex(_a: Complex64, _b: Complex64) -> Option<Complex64> { None }

    /// Returns `None` if the operator is not defined for strings.
    fn string(_a: &str, _b: &str) -> Option<String> { None }
}

pub enum Add {}

impl Arithmetic for Add {
    const NAME: &'static str = "add";
    #[inline(always)]
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a.wrapping_add(&b)) }
    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a + b }
    fn complex(a: Complex64, b: Complex64) -> Option<Complex64> { Some(a + b) }
    fn string(a: &str, b: &str) -> Option<String> { Some(format!("{a}{b}")) }
}

pub enum Sub {}

impl Arithmetic for Sub {
    const NAME: &'static str = "subtract";
    #[inline(always)]
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a.wrapping_sub(&b)) }
    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a - b }
    fn complex(a: Complex64, b: Complex64) -> Option<Complex64> { Some(a - b) }
}

pub enum Mul {}

impl Arithmetic for Mul {
    const NAME: &'static str = "multiply";
    #[inline(always)]
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a.wrapping_mul(&b)) }
    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a * b }
    fn complex(a: Complex64, b: Complex64) -> Option<Complex64> { Some(a * b) }
}

pub enum Div {}

impl Arithmetic for Div {
    const NAME: &'static str = "divide";
    // Truncates. `None` for a zero divisor and for `MIN / -1`.
    #[inline(always)]
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { a.checked_div(&b) }
    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a / b }
    fn complex(a: Complex64, b: Complex64) -> Option<Complex64> { Some(a / b) }
}

pub enum Rem {}

impl Arithmetic for Rem {
    const NAME: &'static str = "remainder";
    #[inline(always)]
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { a.checked_rem(&b) }
    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a % b }
}

pub enum Pow {}

impl Arithmetic for Pow {
    const NAME: &'static str = "power";

    fn integer<T: Integer>(a: T, b: T) -> Option<T> {
        match b.to_usize() {
            Some(exponent) => num_traits::checked_pow(a, exponent),
            None => num_traits::cast(a.to_f64()?.powf(b.to_f64()?).trunc()),
        }
    }

    #[inline(always)]
    fn real<T: Float>(a: T, b: T) -> T { a.powf(b) }
    fn complex(a: Complex64, b: Complex64) -> Option<Complex64> { Some(a.powc(b)) }
}

// ----------------------------------------------------------------------------

/// A binary operator with a `bool` result.
///
/// Ordered types are compared through [`PartialOrd::partial_cmp()`], so NaN
/// compares as unordered: every comparison with it is `false` except
/// [`NotEqual`].
pub trait Comparison {
    const NAME: &'static str;

    /// Decides the result from the outcome of `partial_cmp()`.
    fn ordering(ordering: Option<Ordering>) -> bool;

    /// Decides the result for types that only have equality. Returns `None`
    /// if the operator needs an order.
    fn equality(_equal: bool) -> Option<bool> { None }
}

pub enum Equal {}

impl Comparison for Equal {
    const NAME: &'static str = "equal";
    fn ordering(ordering: Option<Ordering>) -> bool { ordering == Some(Ordering::Equal) }
    fn equality(equal: bool) -> Option<bool> { Some(equal) }
}

pub enum NotEqual {}

impl Comparison for NotEqual {
    const NAME: &'static str = "not-equal";
    fn ordering(ordering: Option<Ordering>) -> bool { ordering != Some(Ordering::Equal) }
    fn equality(equal: bool) -> Option<bool> { Some(!equal) }
}

pub enum Less {}

impl Comparison for Less {
    const NAME: &'static str = "less";
    fn ordering(ordering: Option<Ordering>) -> bool { ordering == Some(Ordering::Less) }
}

pub enum LessEqual {}

impl Comparison for LessEqual {
    const NAME: &'static str = "less-or-equal";
    fn ordering(ordering: Option<Ordering>) -> bool {
        matches!(ordering, Some(Ordering::Less | Ordering::Equal))
    }
}

pub enum Greater {}

impl Comparison for Greater {
    const NAME: &'static str = "greater";
    fn ordering(ordering: Option<Ordering>) -> bool { ordering == Some(Ordering::Greater) }
}

pub enum GreaterEqual {}

impl Comparison for GreaterEqual {
    const NAME: &'static str = "greater-or-equal";
    fn ordering(ordering: Option<Ordering>) -> bool {
        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
    }
}

// ----------------------------------------------------------------------------

/// A binary operator on the bits of integers, or on booleans.
pub trait Bitwise {
    const NAME: &'static str;

    /// Returns `None` when the result is undefined, which the dispatcher
    /// stores as a missing value.
    fn integer<T: Integer>(a: T, b: T) -> Option<T>;

    /// Returns `None` if the operator is not defined for booleans.
    fn boolean(_a: bool, _b: bool) -> Option<bool> { None }
}

pub enum BitAnd {}

impl Bitwise for BitAnd {
    const NAME: &'static str = "and";
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a & b) }
    fn boolean(a: bool, b: bool) -> Option<bool> { Some(a & b) }
}

pub enum BitOr {}

impl Bitwise for BitOr {
    const NAME: &'static str = "or";
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a | b) }
    fn boolean(a: bool, b: bool) -> Option<bool> { Some(a | b) }
}

pub enum BitXor {}

impl Bitwise for BitXor {
    const NAME: &'static str = "xor";
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a ^ b) }
    fn boolean(a: bool, b: bool) -> Option<bool> { Some(a ^ b) }
}

pub enum Shl {}

impl Bitwise for Shl {
    const NAME: &'static str = "shift-left";
    // The shift amount is taken modulo the bit width; negative amounts are
    // undefined.
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a.wrapping_shl(b.to_u32()?)) }
}

pub enum Shr {}

impl Bitwise for Shr {
    const NAME: &'static str = "shift-right";
    // Arithmetic shift, as for Rust's signed integers.
    fn integer<T: Integer>(a: T, b: T) -> Option<T> { Some(a.wrapping_shr(b.to_u32()?)) }
}

// ----------------------------------------------------------------------------

/// A unary operator.
///
/// [`result_type()`] decides both whether the operator is defined for an
/// input type and what type it produces. When the result type differs from
/// the input type the input is converted to the result type first, so e.g.
/// [`Exp`] of an `Int` array calls [`real()`] on `f64`s. The one exception is
/// a complex input with a real result, which goes through
/// [`complex_to_real()`].
///
/// [`result_type()`]: Self::result_type
/// [`real()`]: Self::real
/// [`complex_to_real()`]: Self::complex_to_real
pub trait Unary {
    const NAME: &'static str;

    /// The result type for an input of type `data_type`, or `None` if the
    /// operator is undefined for it.
    fn result_type(data_type: DataType) -> Option<DataType>;

    /// Returns `None` if the operator is not defined for integers.
    fn integer<T: Integer>(_x: T) -> Option<T> { None }

    fn real<T: Float>(x: T) -> T;

    /// Returns `None` if the operator is not defined for complex numbers.
    fn complex(_z: Complex64) -> Option<Complex64> { None }

    /// Returns `None` unless the operator maps complex numbers to reals.
    fn complex_to_real(_z: Complex64) -> Option<f64> { None }

    /// Returns `None` if the operator is not defined for booleans.
    fn boolean(_x: bool) -> Option<bool> { None }
}

/// Result type of operators that keep integers and floats as they are.
fn keep_real(data_type: DataType) -> Option<DataType> {
    (data_type.is_integer() || data_type.is_floating()).then_some(data_type)
}

/// Result type of operators that are computed in floating point: floats and
/// complex numbers are kept, integers and booleans become `Double`.
fn floating(data_type: DataType) -> Option<DataType> {
    match data_type {
        DataType::Float | DataType::Double | DataType::Complex => Some(data_type),
        t if t.is_integer() || t == DataType::Boolean => Some(DataType::Double),
        _ => None,
    }
}

pub enum Abs {}

impl Unary for Abs {
    const NAME: &'static str = "abs";
    fn result_type(data_type: DataType) -> Option<DataType> {
        if data_type == DataType::Complex { Some(DataType::Double) } else { keep_real(data_type) }
    }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(if x < T::zero() { x.wrapping_neg() } else { x }) }
    fn real<T: Float>(x: T) -> T { x.abs() }
    fn complex_to_real(z: Complex64) -> Option<f64> { Some(z.norm()) }
}

pub enum Sign {}

impl Unary for Sign {
    const NAME: &'static str = "sign";
    fn result_type(data_type: DataType) -> Option<DataType> { keep_real(data_type) }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(x.signum()) }
    fn real<T: Float>(x: T) -> T {
        // `Float::signum()` maps zero to one.
        if x > T::zero() { T::one() } else if x < T::zero() { -T::one() } else { x }
    }
}

pub enum Neg {}

impl Unary for Neg {
    const NAME: &'static str = "negate";
    fn result_type(data_type: DataType) -> Option<DataType> {
        if data_type == DataType::Complex { Some(data_type) } else { keep_real(data_type) }
    }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(x.wrapping_neg()) }
    fn real<T: Float>(x: T) -> T { -x }
    fn complex(z: Complex64) -> Option<Complex64> { Some(-z) }
}

pub enum Ceil {}

impl Unary for Ceil {
    const NAME: &'static str = "ceil";
    fn result_type(data_type: DataType) -> Option<DataType> { keep_real(data_type) }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(x) }
    fn real<T: Float>(x: T) -> T { x.ceil() }
}

pub enum Floor {}

impl Unary for Floor {
    const NAME: &'static str = "floor";
    fn result_type(data_type: DataType) -> Option<DataType> { keep_real(data_type) }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(x) }
    fn real<T: Float>(x: T) -> T { x.floor() }
}

/// Logical negation of booleans.
pub enum Not {}

impl Unary for Not {
    const NAME: &'static str = "not";
    fn result_type(data_type: DataType) -> Option<DataType> {
        (data_type == DataType::Boolean).then_some(data_type)
    }
    fn real<T: Float>(x: T) -> T { x }
    fn boolean(x: bool) -> Option<bool> { Some(!x) }
}

/// Bitwise negation of integers, and logical negation of booleans.
pub enum BitNot {}

impl Unary for BitNot {
    const NAME: &'static str = "bitwise-not";
    fn result_type(data_type: DataType) -> Option<DataType> {
        (data_type.is_integer() || data_type == DataType::Boolean).then_some(data_type)
    }
    fn integer<T: Integer>(x: T) -> Option<T> { Some(!x) }
    fn real<T: Float>(x: T) -> T { x }
    fn boolean(x: bool) -> Option<bool> { Some(!x) }
}

macro_rules! floating_unary {
    ($(#[$doc:meta])* $op:ident, $name:literal, $method:ident) => {
        $(#[$doc])*
        pub enum $op {}

        impl Unary for $op {
            const NAME: &'static str = $name;
            fn result_type(data_type: DataType) -> Option<DataType> { floating(data_type) }
            #[inline(always)]
            fn real<T: Float>(x: T) -> T { x.$method() }
            fn complex(z: Complex64) -> Option<Complex64> { Some(z.$method()) }
        }
    };
}

floating_unary!(Exp, "exp", exp);
floating_unary!(/// Natural logarithm.
    Log, "log", ln);
floating_unary!(Sqrt, "sqrt", sqrt);
floating_unary!(Sin, "sin", sin);
floating_unary!(Cos, "cos", cos);
floating_unary!(Tan, "tan", tan);
floating_unary!(Asin, "asin", asin);
floating_unary!(Acos, "acos", acos);
floating_unary!(Atan, "atan", atan);
floating_unary!(Sinh, "sinh", sinh);
floating_unary!(Cosh, "cosh", cosh);
floating_unary!(Tanh, "tanh", tanh);

pub enum Log10 {}

impl Unary for Log10 {
    const NAME: &'static str = "log10";
    fn result_type(data_type: DataType) -> Option<DataType> { floating(data_type) }
    fn real<T: Float>(x: T) -> T { x.log10() }
    fn complex(z: Complex64) -> Option<Complex64> { Some(z.ln() / std::f64::consts::LN_10) }
}

// ----------------------------------------------------------------------------
