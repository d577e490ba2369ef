//! Elementwise operators over whole arrays.
//!
//! A binary operator reads both operands as their [`common_type()`],
//! broadcasts them together, and applies a kernel from [`ops`] to each pair
//! of elements. If both operands have the result's shape and are
//! [fast](NDArray::is_fast), the elements are visited by slot; otherwise an
//! odometer walks the result's coordinates and maps each one back to both
//! operands. The two paths visit the same pairs in the same order.
//!
//! Arithmetic and bitwise results are missing wherever either operand is
//! missing. Comparisons treat a missing operand like NaN.
//!
//! Every operator allocates a new, contiguous result.
//!
//! [`common_type()`]: DataType::common_type

use log::debug;
use smallvec::smallvec;

use super::broadcast::{broadcast_shape, Plan, Remap};
use super::element::{cast, with_element, Element};
use super::index::{size_of, Coordinates};
use super::ops::{self, Arithmetic, Bitwise, Comparison, Unary};
use super::{Coord, DataType, Error, NDArray, Result, Scalar};
use num_complex::Complex64;

/// Applies `f` to each pair of elements of `a` and `b` after broadcasting.
fn zip_with<T: Element, O: Element>(
    op: &'static str,
    a: &NDArray,
    b: &NDArray,
    mut f: impl FnMut(T, T) -> Result<O>,
) -> Result<NDArray> {
    let plan = Plan::new(a.shape(), b.shape())?;
    let (lhs, rhs) = (a.reader::<T>(), b.reader::<T>());
    let mut values = Vec::with_capacity(size_of(plan.shape()));
    if plan.is_same() && a.is_fast() && b.is_fast() {
        debug!("{op}: {} with {} as {} over {:?}, fast path", a.data_type(), b.data_type(), T::DATA_TYPE, plan.shape());
        for slot in 0..a.size() { values.push(f(lhs.get(slot), rhs.get(slot))?); }
    } else {
        debug!("{op}: {} {:?} with {} {:?} as {} over {:?}, general path",
            a.data_type(), a.shape(), b.data_type(), b.shape(), T::DATA_TYPE, plan.shape());
        let (mut i, mut j): (Coord, Coord) = (smallvec![0; a.rank()], smallvec![0; b.rank()]);
        for out in Coordinates::new(plan.shape()) {
            plan.index(&out, &mut i, &mut j);
            let x = lhs.get(a.index().slot_unchecked(&i));
            let y = rhs.get(b.index().slot_unchecked(&j));
            values.push(f(x, y)?);
        }
    }
    NDArray::from_vec(plan.shape(), values)
}

/// Applies `f` to each element of `a`.
fn map<T: Element, O: Element>(
    op: &'static str,
    a: &NDArray,
    mut f: impl FnMut(T) -> Result<O>,
) -> Result<NDArray> {
    debug!("{op}: {} {:?} as {} -> {}", a.data_type(), a.shape(), T::DATA_TYPE, O::DATA_TYPE);
    let reader = a.reader::<T>();
    let values = a.index().slots().map(|slot| f(reader.get(slot))).collect::<Result<Vec<O>>>()?;
    NDArray::from_vec(a.shape(), values)
}

// ----------------------------------------------------------------------------

/// Applies an [`Arithmetic`] operator. The result has the common type of the
/// operands.
///
/// ```
/// use meteoarray::{elementwise, ops, NDArray};
/// let a = NDArray::from_vec(&[3, 1], vec![1, 2, 3]).unwrap();
/// let b = NDArray::from_vec(&[1, 4], vec![10, 20, 30, 40]).unwrap();
/// let c = elementwise::arithmetic::<ops::Add>(&a, &b).unwrap();
/// assert_eq!(c.shape(), &[3, 4]);
/// assert_eq!(c.to_vec::<i32>(), vec![11, 21, 31, 41, 12, 22, 32, 42, 13, 23, 33, 43]);
/// ```
pub fn arithmetic<A: Arithmetic>(a: &NDArray, b: &NDArray) -> Result<NDArray> {
    let data_type = a.data_type().common_type(b.data_type());
    with_element!(data_type, T => {
        // Reject undefined operators even when there are no elements.
        if data_type != DataType::Object { T::arithmetic::<A>(T::zero(), T::zero())?; }
        zip_with::<T, T>(A::NAME, a, b, |x, y| {
            if x.is_missing() || y.is_missing() { return Ok(T::missing()); }
            T::arithmetic::<A>(x, y)
        })
    })
}

/// Applies a [`Comparison`] operator. The result is `Boolean`.
pub fn compare<C: Comparison>(a: &NDArray, b: &NDArray) -> Result<NDArray> {
    let data_type = a.data_type().common_type(b.data_type());
    with_element!(data_type, T => {
        if data_type != DataType::Object { T::compare::<C>(&T::zero(), &T::zero())?; }
        zip_with::<T, bool>(C::NAME, a, b, |x, y| {
            if x.is_missing() || y.is_missing() { return Ok(C::ordering(None)); }
            T::compare::<C>(&x, &y)
        })
    })
}

/// Applies a [`Bitwise`] operator to integers or booleans.
pub fn bitwise<B: Bitwise>(a: &NDArray, b: &NDArray) -> Result<NDArray> {
    let data_type = a.data_type().common_type(b.data_type());
    with_element!(data_type, T => {
        if data_type != DataType::Object { T::bitwise::<B>(T::zero(), T::zero())?; }
        zip_with::<T, T>(B::NAME, a, b, |x, y| {
            if x.is_missing() || y.is_missing() { return Ok(T::missing()); }
            T::bitwise::<B>(x, y)
        })
    })
}

/// Applies a [`Unary`] operator. See [`Unary::result_type()`] for the type of
/// the result.
pub fn unary<U: Unary>(a: &NDArray) -> Result<NDArray> {
    let data_type = a.data_type();
    if data_type == DataType::Object {
        return map::<Scalar, Scalar>(U::NAME, a, |x| Scalar::unary::<U>(x));
    }
    let result_type = U::result_type(data_type).ok_or_else(|| Error::unsupported(U::NAME, data_type))?;
    if data_type == DataType::Complex && result_type != DataType::Complex {
        return map::<Complex64, f64>(U::NAME, a, |z| {
            if z.is_missing() { return Ok(f64::NAN); }
            U::complex_to_real(z).ok_or_else(|| Error::unsupported(U::NAME, data_type))
        });
    }
    with_element!(result_type, T => {
        map::<T, T>(U::NAME, a, |x| if x.is_missing() { Ok(T::missing()) } else { T::unary::<U>(x) })
    })
}

// ----------------------------------------------------------------------------

macro_rules! binary_functions {
    ($($kind:ident::<$op:ident>: $name:ident, $scalar_name:ident;)*) => {
        $(
            #[doc = concat!("Elementwise [`ops::", stringify!($op), "`].")]
            pub fn $name(a: &NDArray, b: &NDArray) -> Result<NDArray> { $kind::<ops::$op>(a, b) }

            #[doc = concat!("As [`", stringify!($name), "()`], with a scalar right operand.")]
            pub fn $scalar_name(a: &NDArray, b: impl Into<Scalar>) -> Result<NDArray> {
                $kind::<ops::$op>(a, &NDArray::scalar(b))
            }
        )*
    };
}

binary_functions! {
    arithmetic::<Add>: add, add_scalar;
    arithmetic::<Sub>: sub, sub_scalar;
    arithmetic::<Mul>: mul, mul_scalar;
    arithmetic::<Div>: div, div_scalar;
    arithmetic::<Rem>: rem, rem_scalar;
    arithmetic::<Pow>: pow, pow_scalar;
    compare::<Less>: less, less_scalar;
    compare::<LessEqual>: less_equal, less_equal_scalar;
    compare::<Greater>: greater, greater_scalar;
    compare::<GreaterEqual>: greater_equal, greater_equal_scalar;
    bitwise::<BitAnd>: bit_and, bit_and_scalar;
    bitwise::<BitOr>: bit_or, bit_or_scalar;
    bitwise::<BitXor>: bit_xor, bit_xor_scalar;
    bitwise::<Shl>: shift_left, shift_left_scalar;
    bitwise::<Shr>: shift_right, shift_right_scalar;
}

/// Elementwise [`ops::Equal`]. A NaN compares unequal to everything,
/// including itself; use [`equal_scalar()`] or [`is_missing()`] to find
/// missing values.
pub fn equal(a: &NDArray, b: &NDArray) -> Result<NDArray> { compare::<ops::Equal>(a, b) }

/// Elementwise [`ops::NotEqual`].
pub fn not_equal(a: &NDArray, b: &NDArray) -> Result<NDArray> { compare::<ops::NotEqual>(a, b) }

/// As [`equal()`], with a scalar right operand, except that a missing `b`
/// selects the missing elements of `a`.
///
/// ```
/// use meteoarray::{elementwise, NDArray};
/// let a = NDArray::from_vec(&[3], vec![1.0, f64::NAN, 3.0]).unwrap();
/// let m = elementwise::equal_scalar(&a, f64::NAN).unwrap();
/// assert_eq!(m.to_vec::<bool>(), vec![false, true, false]);
/// ```
pub fn equal_scalar(a: &NDArray, b: impl Into<Scalar>) -> Result<NDArray> {
    let b = b.into();
    if b.is_missing() { return is_missing(a); }
    equal(a, &NDArray::scalar(b))
}

/// As [`not_equal()`], with a scalar right operand, except that a missing
/// `b` selects the elements of `a` that are not missing.
pub fn not_equal_scalar(a: &NDArray, b: impl Into<Scalar>) -> Result<NDArray> {
    let b = b.into();
    if b.is_missing() { return unary::<ops::Not>(&is_missing(a)?); }
    not_equal(a, &NDArray::scalar(b))
}

macro_rules! unary_functions {
    ($($op:ident: $name:ident;)*) => {
        $(
            #[doc = concat!("Elementwise [`ops::", stringify!($op), "`].")]
            pub fn $name(a: &NDArray) -> Result<NDArray> { unary::<ops::$op>(a) }
        )*
    };
}

unary_functions! {
    Abs: abs;
    Sign: sign;
    Neg: neg;
    Ceil: ceil;
    Floor: floor;
    Exp: exp;
    Log: log;
    Log10: log10;
    Sqrt: sqrt;
    Sin: sin;
    Cos: cos;
    Tan: tan;
    Asin: asin;
    Acos: acos;
    Atan: atan;
    Sinh: sinh;
    Cosh: cosh;
    Tanh: tanh;
    Not: not;
    BitNot: bit_not;
}

// ----------------------------------------------------------------------------

/// A `Boolean` array that is `true` where `a` is missing.
pub fn is_missing(a: &NDArray) -> Result<NDArray> {
    with_element!(a.data_type(), T => map::<T, bool>("is-missing", a, |x| Ok(x.is_missing())))
}

/// A copy of `a` with every missing element replaced by `fill`, converted to
/// the type of `a`.
pub fn fill_missing(a: &NDArray, fill: impl Into<Scalar>) -> Result<NDArray> {
    let fill = fill.into();
    with_element!(a.data_type(), T => {
        let fill = cast::<T>(&fill, "fill-missing")?;
        map::<T, T>("fill-missing", a, |x| Ok(if x.is_missing() { fill.clone() } else { x }))
    })
}

/// A contiguous copy of `a` converted to `data_type`.
pub fn astype(a: &NDArray, data_type: DataType) -> Result<NDArray> { a.astype(data_type) }

/// Selects from `a` where `condition` is `true` and from `b` elsewhere. All
/// three are broadcast together, and the result has the common type of `a`
/// and `b`. A missing condition counts as `false`.
pub fn where_(condition: &NDArray, a: &NDArray, b: &NDArray) -> Result<NDArray> {
    let shape = broadcast_shape(&broadcast_shape(condition.shape(), a.shape())?, b.shape())?;
    let data_type = a.data_type().common_type(b.data_type());
    debug!("where: {:?} ? {} : {} over {:?}", condition.shape(), a.data_type(), b.data_type(), shape);
    let operands = [condition, a, b];
    let remaps = operands.map(|x| Remap::new(x.shape(), shape.len()));
    let mut coords = operands.map(|x| -> Coord { smallvec![0; x.rank()] });
    let slot = |k: usize, coords: &[Coord; 3]| operands[k].index().slot_unchecked(&coords[k]);
    with_element!(data_type, T => {
        let select = condition.reader::<bool>();
        let (lhs, rhs) = (a.reader::<T>(), b.reader::<T>());
        let mut values = Vec::with_capacity(size_of(&shape));
        for out in Coordinates::new(&shape) {
            for (remap, coord) in remaps.iter().zip(coords.iter_mut()) { remap.apply(&out, coord); }
            values.push(if select.get(slot(0, &coords)) {
                lhs.get(slot(1, &coords))
            } else {
                rhs.get(slot(2, &coords))
            });
        }
        NDArray::from_vec(&shape, values)
    })
}

// ----------------------------------------------------------------------------

macro_rules! impl_binary_op_for_array {
    ($trait:ident, $method:ident, $function:ident) => {
        impl<'b> std::ops::$trait<&'b NDArray> for &NDArray {
            type Output = Result<NDArray>;
            fn $method(self, other: &'b NDArray) -> Self::Output { $function(self, other) }
        }
    };
}

impl_binary_op_for_array!(Add, add, add);
impl_binary_op_for_array!(Sub, sub, sub);
impl_binary_op_for_array!(Mul, mul, mul);
impl_binary_op_for_array!(Div, div, div);
impl_binary_op_for_array!(Rem, rem, rem);
impl_binary_op_for_array!(BitAnd, bitand, bit_and);
impl_binary_op_for_array!(BitOr, bitor, bit_or);
impl_binary_op_for_array!(BitXor, bitxor, bit_xor);
impl_binary_op_for_array!(Shl, shl, shift_left);
impl_binary_op_for_array!(Shr, shr, shift_right);

impl std::ops::Neg for &NDArray {
    type Output = Result<NDArray>;
    fn neg(self) -> Self::Output { neg(self) }
}

/// Logical negation for `Boolean` arrays, bitwise for integers.
impl std::ops::Not for &NDArray {
    type Output = Result<NDArray>;
    fn not(self) -> Self::Output { bit_not(self) }
}

// ----------------------------------------------------------------------------
