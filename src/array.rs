use std::fmt;
use std::iter::FromIterator;
use std::ops::*;

use ndarray::{Array1, Array2, ArrayD, IxDyn, ScalarOperand, Zip};
use num_traits::{One, Zero};

use super::index::{translate, Key};

/// A dense numeric array addressed with one-based, inclusive index
/// expressions.
///
/// `MArray` owns one [`ndarray::ArrayD`] and delegates all storage and
/// numeric work to it; its only job is translating the source convention's
/// indexing onto the engine's zero-based, exclusive-stop slices.
///
/// ```
/// use marray::{MArray, Value};
///
/// let x = MArray::from(vec![
///     vec![1., 2., 3.],
///     vec![4., 5., 6.],
///     vec![7., 8., 9.],
/// ]);
///
/// assert_eq!(x.get((2, 3)), Value::Number(6.));
/// assert_eq!(
///     x.get((1..=2, ..)),
///     Value::Array(MArray::from(vec![vec![1., 2., 3.], vec![4., 5., 6.]])),
/// );
/// ```
#[derive(Clone, PartialEq)]
pub struct MArray<T = f64> {
    inner: ArrayD<T>,
}

impl<T> MArray<T> {
    /// Wrap an existing dense array.
    pub fn new(inner: ArrayD<T>) -> Self {
        Self { inner }
    }

    /// Borrow the underlying `ndarray` value.
    pub fn nd(&self) -> &ArrayD<T> {
        &self.inner
    }

    /// Borrow the underlying `ndarray` value mutably.
    pub fn nd_mut(&mut self) -> &mut ArrayD<T> {
        &mut self.inner
    }

    /// Unwrap the underlying `ndarray` value.
    pub fn into_inner(self) -> ArrayD<T> {
        self.inner
    }

    /// The total number of elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The length of each dimension.
    pub fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    /// Visit every element in the engine's logical order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.inner.iter()
    }
}

impl<T: Clone> MArray<T> {
    /// Read the selection addressed by a one-based index [`Key`].
    ///
    /// A one-element result is unwrapped to a bare [`Value::Number`]; anything
    /// else is re-wrapped as [`Value::Array`].
    ///
    /// Panics: out-of-bounds or rank-mismatched keys fail inside the engine's
    /// slicing call.
    pub fn get<K: Key>(&self, key: K) -> Value<T> {
        let specs = key.into_specs();
        let elems = translate(&specs, self.inner.shape());
        let selection = self.inner.slice(elems.as_slice());
        if selection.len() == 1 {
            Value::Number(selection.iter().next().cloned().expect("one element"))
        } else {
            Value::Array(Self::new(selection.to_owned()))
        }
    }

    /// Overwrite the selection addressed by a one-based index [`Key`],
    /// mutating the owned array in place.
    ///
    /// A scalar value fills the selection; an array value is assigned with
    /// the engine's broadcasting rules. Never unwraps.
    ///
    /// Panics: out-of-bounds or rank-mismatched keys, and unbroadcastable
    /// values, fail inside the engine.
    pub fn set<K: Key, V: Into<Value<T>>>(&mut self, key: K, value: V) {
        let specs = key.into_specs();
        let elems = translate(&specs, self.inner.shape());
        let mut selection = self.inner.slice_mut(elems.as_slice());
        match value.into() {
            Value::Number(v) => selection.fill(v),
            Value::Array(other) => selection.assign(other.nd()),
        }
    }

    /// Clone the elements out in the engine's logical order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.iter().cloned().collect()
    }
}

impl<T: Clone + Zero> MArray<T> {
    /// An array of the given shape filled with zero.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }
}

impl<T: Clone + One> MArray<T> {
    /// An array of the given shape filled with one.
    pub fn ones(shape: &[usize]) -> Self {
        Self::new(ArrayD::ones(IxDyn(shape)))
    }
}

/// A scalar or array right-hand operand for an element-wise comparison.
pub trait CmpOperand<T> {
    fn compare(lhs: &MArray<T>, rhs: &Self, cmp: fn(&T, &T) -> bool) -> ArrayD<bool>;
}

impl<T> CmpOperand<T> for T {
    fn compare(lhs: &MArray<T>, rhs: &Self, cmp: fn(&T, &T) -> bool) -> ArrayD<bool> {
        lhs.nd().map(|x| cmp(x, rhs))
    }
}

impl<T> CmpOperand<T> for MArray<T> {
    fn compare(lhs: &MArray<T>, rhs: &Self, cmp: fn(&T, &T) -> bool) -> ArrayD<bool> {
        Zip::from(lhs.nd()).and(rhs.nd()).map_collect(|x, y| cmp(x, y))
    }
}

impl<'a, T> CmpOperand<T> for &'a MArray<T> {
    fn compare(lhs: &MArray<T>, rhs: &Self, cmp: fn(&T, &T) -> bool) -> ArrayD<bool> {
        Zip::from(lhs.nd()).and(rhs.nd()).map_collect(|x, y| cmp(x, y))
    }
}

impl<T: PartialOrd> MArray<T> {
    /// Element-wise `<` against a scalar or another array.
    pub fn lt<R: CmpOperand<T>>(&self, other: R) -> Value<bool> {
        Value::from(R::compare(self, &other, PartialOrd::lt))
    }

    /// Element-wise `<=` against a scalar or another array.
    pub fn le<R: CmpOperand<T>>(&self, other: R) -> Value<bool> {
        Value::from(R::compare(self, &other, PartialOrd::le))
    }

    /// Element-wise `>` against a scalar or another array.
    pub fn gt<R: CmpOperand<T>>(&self, other: R) -> Value<bool> {
        Value::from(R::compare(self, &other, PartialOrd::gt))
    }

    /// Element-wise `>=` against a scalar or another array.
    pub fn ge<R: CmpOperand<T>>(&self, other: R) -> Value<bool> {
        Value::from(R::compare(self, &other, PartialOrd::ge))
    }
}

impl<T: fmt::Debug> fmt::Debug for MArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> From<ArrayD<T>> for MArray<T> {
    fn from(inner: ArrayD<T>) -> Self {
        Self { inner }
    }
}

impl<T> From<Array1<T>> for MArray<T> {
    fn from(array: Array1<T>) -> Self {
        Self::new(array.into_dyn())
    }
}

impl<T> From<Array2<T>> for MArray<T> {
    fn from(array: Array2<T>) -> Self {
        Self::new(array.into_dyn())
    }
}

impl<T> From<Vec<T>> for MArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(Array1::from_vec(values).into_dyn())
    }
}

impl<T> From<Vec<Vec<T>>> for MArray<T> {
    /// Build a two-dimensional array from nested rows.
    ///
    /// Panics: ragged rows fail the engine's shape check.
    fn from(rows: Vec<Vec<T>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let data = rows.into_iter().flatten().collect();
        match ArrayD::from_shape_vec(IxDyn(&[nrows, ncols]), data) {
            Ok(inner) => Self { inner },
            Err(cause) => panic!("{}", cause),
        }
    }
}

impl<T> FromIterator<T> for MArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<T>>())
    }
}

impl<T> IntoIterator for MArray<T> {
    type Item = T;
    type IntoIter = <ArrayD<T> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MArray<T> {
    type Item = &'a T;
    type IntoIter = ndarray::iter::Iter<'a, T, IxDyn>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// The result of reading from or operating on an [`MArray`].
///
/// Every read and every element-wise operation applies the same rule: a
/// one-element result is a bare [`Value::Number`], anything else is an array.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<T = f64> {
    Number(T),
    Array(MArray<T>),
}

impl<T: Clone> Value<T> {
    /// The bare number, if the result unwrapped to one.
    pub fn as_number(&self) -> Option<T> {
        match self {
            Self::Number(value) => Some(value.clone()),
            Self::Array(_) => None,
        }
    }

    /// The result as an array, promoting a bare number to one element.
    pub fn into_array(self) -> MArray<T> {
        match self {
            Self::Number(value) => MArray::from(vec![value]),
            Self::Array(array) => array,
        }
    }
}

impl<T> From<ArrayD<T>> for Value<T> {
    fn from(result: ArrayD<T>) -> Self {
        if result.len() == 1 {
            Self::Number(result.into_iter().next().expect("one element"))
        } else {
            Self::Array(MArray::new(result))
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Number(value)
    }
}

impl<T> From<MArray<T>> for Value<T> {
    fn from(array: MArray<T>) -> Self {
        Self::from(array.into_inner())
    }
}

impl<'a, 'b, T: Clone + Add<Output = T>> Add<&'b MArray<T>> for &'a MArray<T> {
    type Output = Value<T>;

    fn add(self, other: &'b MArray<T>) -> Value<T> {
        Value::from(&self.inner + &other.inner)
    }
}

impl<'a, T: ScalarOperand + Add<Output = T>> Add<T> for &'a MArray<T> {
    type Output = Value<T>;

    fn add(self, other: T) -> Value<T> {
        Value::from(&self.inner + other)
    }
}

impl Add<&MArray<f64>> for f64 {
    type Output = Value<f64>;

    fn add(self, other: &MArray<f64>) -> Value<f64> {
        Value::from(self + &other.inner)
    }
}

impl<'a, 'b, T: Clone + Sub<Output = T>> Sub<&'b MArray<T>> for &'a MArray<T> {
    type Output = Value<T>;

    fn sub(self, other: &'b MArray<T>) -> Value<T> {
        Value::from(&self.inner - &other.inner)
    }
}

impl<'a, T: ScalarOperand + Sub<Output = T>> Sub<T> for &'a MArray<T> {
    type Output = Value<T>;

    fn sub(self, other: T) -> Value<T> {
        Value::from(&self.inner - other)
    }
}

impl Sub<&MArray<f64>> for f64 {
    type Output = Value<f64>;

    fn sub(self, other: &MArray<f64>) -> Value<f64> {
        Value::from(self - &other.inner)
    }
}

impl<'a, 'b, T: Clone + Mul<Output = T>> Mul<&'b MArray<T>> for &'a MArray<T> {
    type Output = Value<T>;

    fn mul(self, other: &'b MArray<T>) -> Value<T> {
        Value::from(&self.inner * &other.inner)
    }
}

impl<'a, T: ScalarOperand + Mul<Output = T>> Mul<T> for &'a MArray<T> {
    type Output = Value<T>;

    fn mul(self, other: T) -> Value<T> {
        Value::from(&self.inner * other)
    }
}

impl Mul<&MArray<f64>> for f64 {
    type Output = Value<f64>;

    fn mul(self, other: &MArray<f64>) -> Value<f64> {
        Value::from(self * &other.inner)
    }
}

impl<'a, 'b, T: Clone + Div<Output = T>> Div<&'b MArray<T>> for &'a MArray<T> {
    type Output = Value<T>;

    fn div(self, other: &'b MArray<T>) -> Value<T> {
        Value::from(&self.inner / &other.inner)
    }
}

impl<'a, T: ScalarOperand + Div<Output = T>> Div<T> for &'a MArray<T> {
    type Output = Value<T>;

    fn div(self, other: T) -> Value<T> {
        Value::from(&self.inner / other)
    }
}

impl Div<&MArray<f64>> for f64 {
    type Output = Value<f64>;

    fn div(self, other: &MArray<f64>) -> Value<f64> {
        Value::from(self / &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::super::index::{Idx, END};
    use super::*;

    fn grid() -> MArray<f64> {
        MArray::from(vec![
            vec![1., 2., 3.],
            vec![4., 5., 6.],
            vec![7., 8., 9.],
        ])
    }

    #[test]
    fn test_get_element() {
        assert_eq!(grid().get((2, 3)), Value::Number(6.));
    }

    #[test]
    fn test_get_rows() {
        let expected = MArray::from(vec![vec![1., 2., 3.], vec![4., 5., 6.]]);
        assert_eq!(grid().get((1..=2, ..)), Value::Array(expected));
    }

    #[test]
    fn test_get_with_end() {
        let x = MArray::from(vec![1., 3., 8., 9., 5.]);
        assert_eq!(
            x.get(Idx::span(2, END)),
            Value::Array(MArray::from(vec![3., 8., 9., 5.]))
        );
    }

    #[test]
    fn test_get_stepped() {
        let x = MArray::from(vec![1., 3., 8., 9., 5.]);
        assert_eq!(
            x.get(Idx::by(1, 2, 5)),
            Value::Array(MArray::from(vec![1., 8., 5.]))
        );
    }

    #[test]
    fn test_get_descending() {
        // the stop of a descending span stays an exclusive bound, exactly as
        // in the ascending substitution
        let x = MArray::from(vec![1., 3., 8., 9., 5.]);
        assert_eq!(
            x.get(Idx::by(5, -2, 1)),
            Value::Array(MArray::from(vec![5., 8.]))
        );
    }

    #[test]
    fn test_one_based_offsets() {
        let x = MArray::from(vec![10., 20., 30., 40.]);
        for pos in 1..=4 {
            assert_eq!(x.get(pos as isize), Value::Number(x.to_vec()[pos - 1]));
        }
    }

    #[test]
    fn test_set_scalar() {
        let mut x = grid();
        x.set((2, 2), 50.);
        assert_eq!(x.get((2, 2)), Value::Number(50.));
    }

    #[test]
    fn test_set_span() {
        let mut x = grid();
        x.set((1, ..), 0.);
        assert_eq!(
            x.get((1, ..)),
            Value::Array(MArray::from(vec![vec![0., 0., 0.]]))
        );
        assert_eq!(x.get((2, 1)), Value::Number(4.));
    }

    #[test]
    fn test_set_array() {
        let mut x = MArray::from(vec![1., 2., 3., 4.]);
        x.set(2..=3, MArray::from(vec![20., 30.]));
        assert_eq!(x, MArray::from(vec![1., 20., 30., 4.]));
    }

    #[test]
    fn test_add_scalar() {
        let x = MArray::from(vec![1., 2., 3.]);
        assert_eq!(&x + 1., Value::Array(MArray::from(vec![2., 3., 4.])));
    }

    #[test]
    fn test_sub_reversed() {
        let x = MArray::from(vec![1., 2., 3.]);
        assert_eq!(10. - &x, Value::Array(MArray::from(vec![9., 8., 7.])));
    }

    #[test]
    fn test_mul_elementwise() {
        let x = MArray::from(vec![1., 2., 3.]);
        let y = MArray::from(vec![4., 5., 6.]);
        assert_eq!(&x * &y, Value::Array(MArray::from(vec![4., 10., 18.])));
    }

    #[test]
    fn test_single_element_unwraps() {
        let x = MArray::from(vec![5.]);
        assert_eq!(&x / 2., Value::Number(2.5));
    }

    #[test]
    fn test_compare_scalar() {
        let x = MArray::from(vec![3., 1., 4., 1., 5.]);
        assert_eq!(
            x.lt(3.),
            Value::Array(MArray::from(vec![false, true, false, true, false]))
        );
    }

    #[test]
    fn test_compare_array() {
        let x = MArray::from(vec![1., 5., 3.]);
        let y = MArray::from(vec![2., 4., 3.]);
        assert_eq!(
            x.ge(&y),
            Value::Array(MArray::from(vec![false, true, true]))
        );
    }

    #[test]
    fn test_iteration() {
        let x = MArray::from(vec![1., 2., 3.]);
        let doubled: Vec<f64> = x.iter().map(|v| v * 2.).collect();
        assert_eq!(doubled, vec![2., 4., 6.]);
        assert_eq!(x.into_iter().sum::<f64>(), 6.);
    }

    #[test]
    fn test_from_iterator() {
        let x: MArray<f64> = (1..=3).map(|v| v as f64).collect();
        assert_eq!(x, MArray::from(vec![1., 2., 3.]));
    }
}
