use std::fmt::{self, Display};

/// The element types an [`NDArray`] can hold.
///
/// # Type Promotion
///
/// When two arrays meet in a binary operator, both are read as their
/// [`DataType::common_type`]:
///
///   - Equal types need no promotion.
///   - [`DataType::Object`] absorbs everything, then [`DataType::Complex`].
///   - [`DataType::String`] and [`DataType::Date`] only combine with
///     themselves; mixed with anything else they promote to `Object`, where
///     most operators are then undefined.
///   - Otherwise the wider type wins, and at equal width the floating type
///     wins over the integer type, which in turn wins over `Boolean`.
///
/// [`NDArray`]: super::NDArray
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 8-bit signed integers (`i8`).
    Byte,
    /// 16-bit signed integers (`i16`).
    Short,
    /// 32-bit signed integers (`i32`).
    Int,
    /// 64-bit signed integers (`i64`).
    Long,
    /// 32-bit floats (`f32`).
    Float,
    /// 64-bit floats (`f64`).
    Double,
    /// `bool`.
    Boolean,
    /// Complex numbers with `f64` parts.
    Complex,
    /// Owned strings.
    String,
    /// Instants in milliseconds since the Unix epoch. See [`Date`].
    ///
    /// [`Date`]: super::Date
    Date,
    /// Heterogeneous [`Scalar`]s.
    ///
    /// [`Scalar`]: super::Scalar
    Object,
}

impl DataType {
    /// All data types, in declaration order.
    pub const ALL: &'static [DataType] = &[
        DataType::Byte, DataType::Short, DataType::Int, DataType::Long,
        DataType::Float, DataType::Double, DataType::Boolean, DataType::Complex,
        DataType::String, DataType::Date, DataType::Object,
    ];

    /// The width in bytes of one element, as used by the promotion rules.
    /// Variable-width types report `0`.
    pub fn byte_width(self) -> usize {
        match self {
            DataType::Byte | DataType::Boolean => 1,
            DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Long | DataType::Double | DataType::Date => 8,
            DataType::Complex => 16,
            DataType::String | DataType::Object => 0,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, DataType::Byte | DataType::Short | DataType::Int | DataType::Long)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Integers, floats and `Boolean`: everything that reads losslessly
    /// enough as an `f64` to be reduced.
    pub fn is_real(self) -> bool {
        self.is_integer() || self.is_floating() || self == DataType::Boolean
    }

    /// Integers, floats and `Complex`.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating() || self == DataType::Complex
    }

    /// Returns the type both `self` and `other` are promoted to when they
    /// meet in a binary operator.
    ///
    /// This is symmetric: `a.common_type(b) == b.common_type(a)`.
    ///
    /// ```
    /// use meteoarray::DataType;
    /// assert_eq!(DataType::Int.common_type(DataType::Float), DataType::Float);
    /// assert_eq!(DataType::Float.common_type(DataType::Double), DataType::Double);
    /// assert_eq!(DataType::Int.common_type(DataType::Int), DataType::Int);
    /// assert_eq!(DataType::Long.common_type(DataType::Complex), DataType::Complex);
    /// ```
    pub fn common_type(self, other: DataType) -> DataType {
        use DataType::*;
        if self == other { return self; }
        match (self, other) {
            (Object, _) | (_, Object) => Object,
            (String | Date, _) | (_, String | Date) => Object,
            (Complex, _) | (_, Complex) => Complex,
            _ => {
                let (a, b) = (self.byte_width(), other.byte_width());
                if a != b { return if a > b { self } else { other }; }
                // Equal widths: floating beats integer beats boolean.
                let rank = |t: DataType| if t.is_floating() { 2 } else if t.is_integer() { 1 } else { 0 };
                if rank(self) >= rank(other) { self } else { other }
            },
        }
    }

    /// Folds [`common_type()`] over `data_types`. Returns `None` if the slice
    /// is empty.
    ///
    /// [`common_type()`]: Self::common_type
    pub fn promoted(data_types: &[DataType]) -> Option<DataType> {
        data_types.iter().copied().reduce(DataType::common_type)
    }

    /// The name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Boolean => "boolean",
            DataType::Complex => "complex",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::Object => "object",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use DataType::*;

    #[test]
    fn common_type_laws() {
        assert_eq!(Int.common_type(Float), Float);
        assert_eq!(Float.common_type(Double), Double);
        assert_eq!(Int.common_type(Int), Int);
        assert_eq!(Long.common_type(Double), Double);
        assert_eq!(Long.common_type(Float), Long);
        assert_eq!(Byte.common_type(Short), Short);
        assert_eq!(Boolean.common_type(Byte), Byte);
        assert_eq!(Boolean.common_type(Float), Float);
        assert_eq!(Double.common_type(Complex), Complex);
        assert_eq!(Complex.common_type(Object), Object);
        assert_eq!(String.common_type(Int), Object);
        assert_eq!(Date.common_type(Long), Object);
        assert_eq!(Date.common_type(Date), Date);
    }

    #[test]
    fn common_type_is_symmetric() {
        for &a in DataType::ALL {
            for &b in DataType::ALL {
                assert_eq!(a.common_type(b), b.common_type(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn promoted() {
        assert_eq!(DataType::promoted(&[]), None);
        assert_eq!(DataType::promoted(&[Short]), Some(Short));
        assert_eq!(DataType::promoted(&[Boolean, Int, Float]), Some(Float));
        assert_eq!(DataType::promoted(&[Byte, Long, Float]), Some(Long));
    }

    #[test]
    fn predicates() {
        assert!(Short.is_integer() && !Short.is_floating());
        assert!(Boolean.is_real() && !Boolean.is_numeric());
        assert!(Complex.is_numeric() && !Complex.is_real());
        assert_eq!(String.byte_width(), 0);
        assert_eq!(Complex.to_string(), "complex");
    }
}
