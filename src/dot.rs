//! Vector and matrix products.

use log::debug;

use super::{Error, NDArray, Result};

/// The dot product of vectors, or the matrix product of matrices, computed in
/// `f64`.
///
/// A 1-D operand is a row vector on the left and a column vector on the
/// right, and the corresponding dimension is dropped from the result:
///
///   - `[k] · [k]` is rank 0.
///   - `[m, k] · [k]` has shape `[m]`.
///   - `[k] · [k, n]` has shape `[n]`.
///   - `[m, k] · [k, n]` has shape `[m, n]`.
///
/// Missing values are NaN and so propagate through the sums.
///
/// ```
/// use meteoarray::{dot, NDArray};
/// let a = NDArray::from_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let x = NDArray::from_vec(&[3], vec![1.0, 0.0, -1.0]).unwrap();
/// assert_eq!(dot(&a, &x).unwrap().to_vec::<f64>(), vec![-2.0, -2.0]);
/// ```
pub fn dot(a: &NDArray, b: &NDArray) -> Result<NDArray> {
    for x in [a, b] {
        if !x.data_type().is_real() { return Err(Error::unsupported("dot", x.data_type())); }
    }
    let (m, k) = match *a.shape() {
        [k] => (None, k),
        [m, k] => (Some(m), k),
        _ => return Err(Error::unsupported("dot", a.data_type())),
    };
    let (k2, n) = match *b.shape() {
        [k] => (k, None),
        [k, n] => (k, Some(n)),
        _ => return Err(Error::unsupported("dot", b.data_type())),
    };
    if k != k2 { return Err(Error::shape_mismatch(a.shape(), b.shape())); }
    debug!("dot: {:?} x {:?}", a.shape(), b.shape());

    let (rows, columns) = (m.unwrap_or(1), n.unwrap_or(1));
    let (lhs, rhs) = (a.to_vec::<f64>(), b.to_vec::<f64>());
    let mut product = vec![0.0; rows * columns];
    for i in 0..rows {
        for j in 0..columns {
            product[i * columns + j] = (0..k).map(|l| lhs[i * k + l] * rhs[l * columns + j]).sum();
        }
    }
    let shape: Vec<usize> = m.into_iter().chain(n).collect();
    NDArray::from_vec(&shape, product)
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    #[test]
    fn shapes() {
        let v = NDArray::from_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        let inner = dot(&v, &v).unwrap();
        assert_eq!(inner.rank(), 0);
        assert_eq!(inner.get_double(&[]), Ok(14.0));

        let a = NDArray::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = a.transpose(0, 1).unwrap();
        let square = dot(&a, &b).unwrap();
        assert_eq!(square.shape(), &[2, 2]);
        assert_eq!(square.to_vec::<f64>(), vec![14.0, 32.0, 32.0, 77.0]);
        assert_eq!(dot(&v, &b).unwrap().to_vec::<f64>(), vec![14.0, 32.0]);
        assert_eq!(dot(&b, &NDArray::from_vec(&[2], vec![1, 1]).unwrap()).unwrap().to_vec::<f64>(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn errors_and_missing() {
        let v = NDArray::from_vec(&[3], vec![1.0, f64::NAN, 3.0]).unwrap();
        assert!(dot(&v, &v).unwrap().get_double(&[]).unwrap().is_nan());
        let w = NDArray::zeros(DataType::Double, &[2]);
        assert!(matches!(dot(&v, &w), Err(Error::ShapeMismatch { .. })));
        assert!(dot(&NDArray::zeros(DataType::Double, &[1, 1, 1]), &w).is_err());
        assert!(dot(&NDArray::zeros(DataType::Complex, &[2]), &w).is_err());
    }
}
