//! Strided N-dimensional arrays for gridded scientific data with gaps.
//!
//! [`NDArray`] is a typed, shaped view of some reference-counted
//! [`Storage`]. Its element type is one of the [`DataType`]s and its shape can
//! have any rank. An [`Index`] maps each coordinate to a storage slot through
//! per-dimension strides and an offset, so sections, transposes and flips are
//! new views of the same elements rather than copies. Call
//! [`NDArray::copy()`] to get independent elements.
//!
//! Module [`elementwise`] applies unary and binary operators to whole arrays.
//! Binary operators promote both operands to their
//! [`common type`](DataType::common_type) and [`broadcast`] them to a common
//! shape. The operators themselves are the uninhabited types in [`ops`],
//! which the dispatcher instantiates once per element representation.
//!
//! Module [`reduce`] collapses one axis (or the whole array) with a
//! [`Reducer`](reduce::Reducer) such as a sum, a standard deviation or an
//! argmax.
//!
//! # Missing values
//!
//! Gaps in the data are stored in-band: floating types use NaN, integer types
//! and [`Date`] use their minimum value, and complex numbers use a NaN
//! component. Elementwise arithmetic propagates missing values, whereas
//! reductions skip them:
//!
//! ```
//! use meteoarray::{elementwise, reduce, NDArray};
//! let a = NDArray::from_vec(&[3], vec![1.0, f64::NAN, 3.0]).unwrap();
//! assert_eq!(reduce::sum_all(&a), Ok(4.0));
//! assert!(elementwise::add(&a, &a).unwrap().get_double(&[1]).unwrap().is_nan());
//! ```

use smallvec::SmallVec;

/// The extents of an array, one per dimension.
pub type Shape = SmallVec<[usize; 6]>;

/// The storage distance between neighbouring elements, one per dimension.
pub type Strides = SmallVec<[isize; 6]>;

/// A coordinate of an element, one index per dimension.
pub type Coord = SmallVec<[usize; 6]>;

mod error;
pub use error::{Error, Result};

mod dtype;
pub use dtype::{DataType};

mod scalar;
pub use scalar::{Scalar, Date};

mod element;
pub use element::{Element};

mod storage;
pub use storage::{Storage, Buffer};

mod index;
pub use index::{row_major_strides, size_of, Index, Counter, Coordinates, Slots};

mod range;
pub use range::{Range};

pub mod broadcast;
pub use broadcast::{broadcast_shape, Broadcast, Plan};

mod array;
pub use array::{NDArray, Values};

mod cursor;
pub use cursor::{Cursor};

pub mod ops;

pub mod elementwise;

pub mod reduce;

mod dot;
pub use dot::{dot};
