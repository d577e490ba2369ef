//! Collapsing one axis of an array, or the whole array, to summary values.
//!
//! Unlike the elementwise operators, reducers skip missing values instead of
//! propagating them: the sum of `[1, NaN, 3]` is `4`.

use log::debug;

use super::element::Element;
use super::index::{size_of, Coordinates};
use super::{DataType, Error, NDArray, Range, Result, Shape};

/// Summarises a sequence of values.
///
/// The engine feeds [`reduce()`] the valid (non-missing) elements of one
/// lane of the input, each paired with its position along the lane.
///
/// [`reduce()`]: Self::reduce
pub trait Reducer {
    /// The name used in error messages.
    const NAME: &'static str;

    /// The type the input elements are converted to.
    type Item: Element;

    /// The type of the result.
    type Output: Element;

    /// Returns `true` if this reducer is defined on arrays of `data_type`.
    fn accepts(data_type: DataType) -> bool { data_type.is_real() }

    fn reduce(&self, values: impl Iterator<Item = (usize, Self::Item)>) -> Self::Output;
}

/// Applies `reducer` along `axis`. The result has the shape of `a` without
/// dimension `axis`.
///
/// ```
/// use meteoarray::{reduce, NDArray};
/// let a = NDArray::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, f64::NAN, 6.0]).unwrap();
/// let sums = reduce::reduce(&a, 1, &reduce::Sum).unwrap();
/// assert_eq!(sums.to_vec::<f64>(), vec![6.0, 10.0]);
/// ```
pub fn reduce<R: Reducer>(a: &NDArray, axis: usize, reducer: &R) -> Result<NDArray> {
    let rank = a.rank();
    if axis >= rank { return Err(Error::AxisOutOfRange { axis, rank }); }
    if !R::accepts(a.data_type()) { return Err(Error::unsupported(R::NAME, a.data_type())); }
    let shape: Shape = a.shape().iter().enumerate()
        .filter(|&(d, _)| d != axis).map(|(_, &n)| n).collect();
    debug!("{}: {} {:?} along axis {axis} -> {:?}", R::NAME, a.data_type(), a.shape(), shape);

    let mut values = Vec::with_capacity(size_of(&shape));
    if a.shape()[axis] == 0 {
        // There are no lanes to section; every output sees no values.
        values.extend(Coordinates::new(&shape).map(|_| reducer.reduce(std::iter::empty::<(usize, R::Item)>())));
        return NDArray::from_vec(&shape, values);
    }
    let mut ranges: Vec<Range> = a.shape().iter().map(|&n| Range::full(n)).collect();
    let others: Vec<usize> = (0..rank).filter(|&d| d != axis).collect();
    for coord in Coordinates::new(&shape) {
        for (&d, &i) in others.iter().zip(coord.iter()) { ranges[d] = Range::single(i); }
        let lane = a.section(&ranges)?;
        values.push(reducer.reduce(lane.valid_values::<R::Item>()));
    }
    NDArray::from_vec(&shape, values)
}

/// Applies `reducer` to every element of `a`, in row-major order. Positions
/// are row-major positions in `a`.
pub fn reduce_all<R: Reducer>(a: &NDArray, reducer: &R) -> Result<R::Output> {
    if !R::accepts(a.data_type()) { return Err(Error::unsupported(R::NAME, a.data_type())); }
    debug!("{}: {} {:?}", R::NAME, a.data_type(), a.shape());
    Ok(reducer.reduce(a.valid_values::<R::Item>()))
}

// ----------------------------------------------------------------------------

/// The sum of the valid values, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Sum;

impl Reducer for Sum {
    const NAME: &'static str = "sum";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        let (count, sum) = values.fold((0usize, 0.0), |(n, s), (_, x)| (n + 1, s + x));
        if count == 0 { f64::NAN } else { sum }
    }
}

/// The mean of the valid values, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Mean;

impl Reducer for Mean {
    const NAME: &'static str = "mean";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        let (count, sum) = values.fold((0usize, 0.0), |(n, s), (_, x)| (n + 1, s + x));
        if count == 0 { f64::NAN } else { sum / count as f64 }
    }
}

/// The product of the valid values, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Prod;

impl Reducer for Prod {
    const NAME: &'static str = "prod";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        let (count, product) = values.fold((0usize, 1.0), |(n, p), (_, x)| (n + 1, p * x));
        if count == 0 { f64::NAN } else { product }
    }
}

/// The smallest valid value, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Min;

impl Reducer for Min {
    const NAME: &'static str = "min";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        values.map(|(_, x)| x).reduce(f64::min).unwrap_or(f64::NAN)
    }
}

/// The largest valid value, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Max;

impl Reducer for Max {
    const NAME: &'static str = "max";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        values.map(|(_, x)| x).reduce(f64::max).unwrap_or(f64::NAN)
    }
}

/// The variance of the valid values with `ddof` delta degrees of freedom:
/// `0` for the population variance, `1` for the sample variance.
///
/// Computed in two passes, so the mean is subtracted before squaring. NaN if
/// there are no more than `ddof` valid values.
#[derive(Debug, Default, Copy, Clone)]
pub struct Var {
    pub ddof: usize,
}

impl Var {
    fn of(ddof: usize, values: &[f64]) -> f64 {
        let n = values.len();
        if n == 0 || n <= ddof { return f64::NAN; }
        let mean = values.iter().sum::<f64>() / n as f64;
        let squares: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
        squares / (n - ddof) as f64
    }
}

impl Reducer for Var {
    const NAME: &'static str = "var";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        Var::of(self.ddof, &values.map(|(_, x)| x).collect::<Vec<_>>())
    }
}

/// The square root of [`Var`].
#[derive(Debug, Default, Copy, Clone)]
pub struct Std {
    pub ddof: usize,
}

impl Reducer for Std {
    const NAME: &'static str = "std";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        Var::of(self.ddof, &values.map(|(_, x)| x).collect::<Vec<_>>()).sqrt()
    }
}

/// One of the five points of a box plot.
///
/// A box plot needs at least 4 valid values, so every `Quartile`, including
/// `Quartile::Median`, is NaN for fewer. [`Median`] has no such minimum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Quartile {
    Min,
    Lower,
    Median,
    Upper,
    Max,
}

impl Quartile {
    /// The number of quarters below this point.
    fn quarters(self) -> usize {
        match self {
            Quartile::Min => 0,
            Quartile::Lower => 1,
            Quartile::Median => 2,
            Quartile::Upper => 3,
            Quartile::Max => 4,
        }
    }
}

/// Returns the order statistic at `quarters / 4` of the way through
/// `sorted`, interpolating linearly between neighbours.
fn order_statistic(sorted: &[f64], quarters: usize) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else { return f64::NAN };
    let (whole, part) = (quarters * last / 4, quarters * last % 4);
    if part == 0 { return sorted[whole]; }
    let fraction = part as f64 / 4.0;
    sorted[whole] + (sorted[whole + 1] - sorted[whole]) * fraction
}

fn sorted(values: impl Iterator<Item = (usize, f64)>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.map(|(_, x)| x).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// The median of the valid values, or NaN if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct Median;

impl Reducer for Median {
    const NAME: &'static str = "median";
    type Item = f64;
    type Output = f64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        order_statistic(&sorted(values), 2)
    }
}

impl Reducer for Quartile {
    const NAME: &'static str = "quartile";
    type Item = f64;
    type Output = f64;

    /// NaN if there are fewer than 4 valid values.
    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> f64 {
        let sorted = sorted(values);
        if sorted.len() < 4 { return f64::NAN; }
        order_statistic(&sorted, self.quarters())
    }
}

/// Returns the position of the first value `x` for which `better(x, best)`
/// holds for every earlier best, or `0` if there are no values.
fn arg_best(values: impl Iterator<Item = (usize, f64)>, better: impl Fn(f64, f64) -> bool) -> i64 {
    let mut best: Option<(usize, f64)> = None;
    for (position, x) in values {
        match best {
            Some((_, b)) if !better(x, b) => {},
            _ => best = Some((position, x)),
        }
    }
    best.map_or(0, |(position, _)| position as i64)
}

/// The position of the first smallest valid value, or `0` if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct ArgMin;

impl Reducer for ArgMin {
    const NAME: &'static str = "argmin";
    type Item = f64;
    type Output = i64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> i64 {
        arg_best(values, |x, best| x < best)
    }
}

/// The position of the first largest valid value, or `0` if there are none.
#[derive(Debug, Default, Copy, Clone)]
pub struct ArgMax;

impl Reducer for ArgMax {
    const NAME: &'static str = "argmax";
    type Item = f64;
    type Output = i64;

    fn reduce(&self, values: impl Iterator<Item = (usize, f64)>) -> i64 {
        arg_best(values, |x, best| x > best)
    }
}

/// `true` if any valid value is non-zero.
#[derive(Debug, Default, Copy, Clone)]
pub struct Any;

impl Reducer for Any {
    const NAME: &'static str = "any";
    type Item = bool;
    type Output = bool;

    fn reduce(&self, mut values: impl Iterator<Item = (usize, bool)>) -> bool {
        values.any(|(_, x)| x)
    }
}

/// `true` if every valid value is non-zero.
#[derive(Debug, Default, Copy, Clone)]
pub struct All;

impl Reducer for All {
    const NAME: &'static str = "all";
    type Item = bool;
    type Output = bool;

    fn reduce(&self, mut values: impl Iterator<Item = (usize, bool)>) -> bool {
        values.all(|(_, x)| x)
    }
}

// ----------------------------------------------------------------------------

macro_rules! reduce_functions {
    ($($reducer:expr => $name:ident, $all:ident -> $output:ty;)*) => {
        $(
            #[doc = concat!("Applies [`", stringify!($reducer), "`] along `axis`.")]
            pub fn $name(a: &NDArray, axis: usize) -> Result<NDArray> { reduce(a, axis, &$reducer) }

            #[doc = concat!("Applies [`", stringify!($reducer), "`] to every element.")]
            pub fn $all(a: &NDArray) -> Result<$output> { reduce_all(a, &$reducer) }
        )*
    };
}

reduce_functions! {
    Sum => sum, sum_all -> f64;
    Mean => mean, mean_all -> f64;
    Prod => prod, prod_all -> f64;
    Min => min, min_all -> f64;
    Max => max, max_all -> f64;
    Median => median, median_all -> f64;
    Any => any, any_all -> bool;
    All => all, all_all -> bool;
}

/// Applies [`Var`] along `axis`.
pub fn var(a: &NDArray, axis: usize, ddof: usize) -> Result<NDArray> { reduce(a, axis, &Var { ddof }) }

/// Applies [`Var`] to every element.
pub fn var_all(a: &NDArray, ddof: usize) -> Result<f64> { reduce_all(a, &Var { ddof }) }

/// Applies [`Std`] along `axis`.
///
/// ```
/// use meteoarray::{reduce, NDArray};
/// let a = NDArray::from_vec(&[8], vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// let s = reduce::std(&a, 0, 1).unwrap().get_double(&[]).unwrap();
/// assert!((s - 2.13809).abs() < 1e-5);
/// ```
pub fn std(a: &NDArray, axis: usize, ddof: usize) -> Result<NDArray> { reduce(a, axis, &Std { ddof }) }

/// Applies [`Std`] to every element.
pub fn std_all(a: &NDArray, ddof: usize) -> Result<f64> { reduce_all(a, &Std { ddof }) }

/// Applies a [`Quartile`] along `axis`.
pub fn quartile(a: &NDArray, axis: usize, q: Quartile) -> Result<NDArray> { reduce(a, axis, &q) }

/// Applies a [`Quartile`] to every element.
pub fn quartile_all(a: &NDArray, q: Quartile) -> Result<f64> { reduce_all(a, &q) }

/// Applies [`ArgMin`] along `axis`. The result is `Long`.
pub fn argmin(a: &NDArray, axis: usize) -> Result<NDArray> { reduce(a, axis, &ArgMin) }

/// The row-major position of the first smallest valid element.
pub fn argmin_all(a: &NDArray) -> Result<usize> { Ok(reduce_all(a, &ArgMin)? as usize) }

/// Applies [`ArgMax`] along `axis`. The result is `Long`.
pub fn argmax(a: &NDArray, axis: usize) -> Result<NDArray> { reduce(a, axis, &ArgMax) }

/// The row-major position of the first largest valid element.
pub fn argmax_all(a: &NDArray) -> Result<usize> { Ok(reduce_all(a, &ArgMax)? as usize) }

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementwise;

    use approx::assert_relative_eq;

    fn doubles(shape: &[usize], values: &[f64]) -> NDArray {
        NDArray::from_vec(shape, values.to_vec()).unwrap()
    }

    #[test]
    fn skip_versus_propagate() {
        let a = doubles(&[3], &[1.0, f64::NAN, 3.0]);
        assert_eq!(sum_all(&a), Ok(4.0));
        assert_eq!(sum(&a, 0).unwrap().get_double(&[]), Ok(4.0));
        assert!(elementwise::add(&a, &a).unwrap().get_double(&[1]).unwrap().is_nan());
        assert_eq!(mean_all(&a), Ok(2.0));
    }

    #[test]
    fn axes() {
        let a = doubles(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(sum(&a, 0).unwrap().to_vec::<f64>(), vec![5.0, 7.0, 9.0]);
        assert_eq!(sum(&a, 1).unwrap().to_vec::<f64>(), vec![6.0, 15.0]);
        assert_eq!(prod(&a, 1).unwrap().to_vec::<f64>(), vec![6.0, 120.0]);
        assert_eq!(max(&a, 0).unwrap().to_vec::<f64>(), vec![4.0, 5.0, 6.0]);
        assert_eq!(min(&a.transpose(0, 1).unwrap(), 1).unwrap().to_vec::<f64>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(sum(&a, 2).unwrap_err(), Error::AxisOutOfRange { axis: 2, rank: 2 });

        let cube = NDArray::from_vec(&[2, 3, 4], (0..24).collect::<Vec<i32>>()).unwrap();
        let middle = sum(&cube, 1).unwrap();
        assert_eq!(middle.shape(), &[2, 4]);
        assert_eq!(middle.get_double(&[1, 2]), Ok((14 + 18 + 22) as f64));
        assert_eq!(middle.data_type(), DataType::Double);
    }

    #[test]
    fn no_valid_values() {
        let a = doubles(&[2, 2], &[f64::NAN, 1.0, f64::NAN, f64::NAN]);
        let sums = sum(&a, 0).unwrap().to_vec::<f64>();
        assert!(sums[0].is_nan());
        assert_eq!(sums[1], 1.0);
        assert!(min(&a, 0).unwrap().get_double(&[0]).unwrap().is_nan());
        assert_eq!(argmax(&a, 0).unwrap().to_vec::<i64>(), vec![0, 0]);
        assert!(mean_all(&doubles(&[0], &[])).unwrap().is_nan());
        assert_eq!(sum(&NDArray::zeros(DataType::Int, &[0, 3]), 0).unwrap().shape(), &[3]);
    }

    #[test]
    fn variance() {
        let a = doubles(&[8], &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(std_all(&a, 1).unwrap(), 2.138089935299395, epsilon = 1e-12);
        assert_relative_eq!(std_all(&a, 0).unwrap(), 2.0);
        assert_relative_eq!(var_all(&a, 0).unwrap(), 4.0);
        assert!(var_all(&doubles(&[1], &[3.0]), 1).unwrap().is_nan());
        let with_gap = doubles(&[3], &[1.0, f64::NAN, 3.0]);
        assert_relative_eq!(var_all(&with_gap, 1).unwrap(), 2.0);
    }

    #[test]
    fn order_statistics() {
        let a = doubles(&[5], &[9.0, 1.0, f64::NAN, 4.0, 3.0]);
        assert_eq!(median_all(&a), Ok(3.5));
        assert_eq!(quartile_all(&a, Quartile::Min), Ok(1.0));
        assert_eq!(quartile_all(&a, Quartile::Lower), Ok(2.5));
        assert_eq!(quartile_all(&a, Quartile::Upper), Ok(5.25));
        assert_eq!(quartile_all(&a, Quartile::Max), Ok(9.0));
        assert!(quartile_all(&doubles(&[3], &[1.0, 2.0, 3.0]), Quartile::Lower).unwrap().is_nan());
        let three = doubles(&[3], &[5.0, 1.0, 3.0]);
        assert_eq!(median_all(&three), Ok(3.0));
        assert!(quartile_all(&three, Quartile::Median).unwrap().is_nan());
        assert!(median_all(&doubles(&[1], &[f64::NAN])).unwrap().is_nan());
    }

    #[test]
    fn integer_markers_are_skipped() {
        let a = NDArray::from_vec(&[3], vec![1, i32::MIN, 3]).unwrap();
        assert_eq!(sum_all(&a), Ok(4.0));
        assert_eq!(mean_all(&a), Ok(2.0));
        assert_eq!(min_all(&a), Ok(1.0));
        let b = NDArray::from_vec(&[3], vec![5i16, i16::MIN, 3]).unwrap();
        assert_eq!(argmin_all(&b), Ok(2));

        let grid = NDArray::from_vec(&[2, 2], vec![i32::MIN, i32::MIN, 4, 7]).unwrap();
        let mins = min(&grid, 1).unwrap().to_vec::<f64>();
        assert!(mins[0].is_nan());
        assert_eq!(mins[1], 4.0);
        assert_eq!(sum(&grid, 0).unwrap().to_vec::<f64>(), vec![4.0, 7.0]);
        assert_eq!(argmax(&grid, 1).unwrap().to_vec::<i64>(), vec![0, 1]);
    }

    #[test]
    fn arg_extremes() {
        let a = NDArray::from_vec(&[4], vec![3, 1, 1, 5]).unwrap();
        assert_eq!(argmin(&a, 0).unwrap().get_long(&[]), Ok(1));
        assert_eq!(argmax_all(&a), Ok(3));
        let negative = doubles(&[2, 3], &[-5.0, -2.0, -9.0, -1.0, f64::NAN, -3.0]);
        assert_eq!(argmax_all(&negative), Ok(3));
        assert_eq!(argmin_all(&negative), Ok(2));
        assert_eq!(argmax(&negative, 1).unwrap().to_vec::<i64>(), vec![1, 0]);
        assert_eq!(argmin(&negative, 0).unwrap().data_type(), DataType::Long);
    }

    #[test]
    fn logical() {
        let flags = NDArray::from_vec(&[2, 2], vec![true, false, false, false]).unwrap();
        assert_eq!(any(&flags, 1).unwrap().to_vec::<bool>(), vec![true, false]);
        assert_eq!(all(&flags, 0).unwrap().to_vec::<bool>(), vec![false, false]);
        assert_eq!(any_all(&flags), Ok(true));
        let numbers = doubles(&[3], &[2.0, f64::NAN, -1.0]);
        assert_eq!(all_all(&numbers), Ok(true));
    }

    #[test]
    fn unsupported_types() {
        let words = NDArray::from_vec(&[2], vec!["a".to_owned(), "b".to_owned()]).unwrap();
        assert_eq!(sum(&words, 0).unwrap_err(), Error::unsupported("sum", DataType::String));
        assert!(mean_all(&NDArray::zeros(DataType::Complex, &[2])).is_err());
    }
}
