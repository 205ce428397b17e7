use std::collections::HashMap;
use std::fs::{File, OpenOptions};

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use super::array::{MArray, Value};
use super::text::{sprintf, FmtArg};
use super::{Error, Result};

/// A zero-filled value with the source convention's shape overloading.
///
/// No dimensions give the scalar `0`; one dimension `n` gives an `n`×`n`
/// matrix; `[1, n]` gives a row of length `n`; any other dimension list is
/// used as given.
pub fn zeros(dims: &[usize]) -> Value<f64> {
    match dims {
        [] => Value::Number(0.),
        &[n] => Value::Array(MArray::zeros(&[n, n])),
        &[1, n] => Value::Array(MArray::zeros(&[n])),
        other => Value::Array(MArray::zeros(other)),
    }
}

/// A one-filled value with the same shape overloading as [`zeros`].
pub fn ones(dims: &[usize]) -> Value<f64> {
    match dims {
        [] => Value::Number(1.),
        &[n] => Value::Array(MArray::ones(&[n, n])),
        &[1, n] => Value::Array(MArray::ones(&[n])),
        other => Value::Array(MArray::ones(other)),
    }
}

/// Uniform samples on `[0, 1)` with the same shape overloading as [`zeros`].
pub fn rand(dims: &[usize]) -> Value<f64> {
    let uniform = Uniform::new(0., 1.);
    match dims {
        [] => Value::Number(rand::thread_rng().gen()),
        &[n] => Value::Array(MArray::new(ArrayD::random(IxDyn(&[n, n]), uniform))),
        &[1, n] => Value::Array(MArray::new(ArrayD::random(IxDyn(&[n]), uniform))),
        other => Value::Array(MArray::new(ArrayD::random(IxDyn(other), uniform))),
    }
}

/// Standard normal samples with the same shape overloading as [`zeros`].
pub fn randn(dims: &[usize]) -> Value<f64> {
    match dims {
        [] => Value::Number(StandardNormal.sample(&mut rand::thread_rng())),
        &[n] => Value::Array(MArray::new(ArrayD::random(IxDyn(&[n, n]), StandardNormal))),
        &[1, n] => Value::Array(MArray::new(ArrayD::random(IxDyn(&[n]), StandardNormal))),
        other => Value::Array(MArray::new(ArrayD::random(IxDyn(other), StandardNormal))),
    }
}

/// The `(rows, cols)` of an array, treating a one-dimensional array as a
/// single row (or as zero rows when it has no elements) and a zero-rank
/// array as 1×1.
pub fn size<T>(x: &MArray<T>) -> (usize, usize) {
    match x.shape() {
        [] => (1, 1),
        &[len] => (usize::from(len != 0), len),
        &[rows, cols, ..] => (rows, cols),
    }
}

/// One component of [`size`], with a one-based dimension number.
///
/// Panics: if `dim` exceeds the array rank (for `dim` > 2).
pub fn size_along<T>(x: &MArray<T>, dim: usize) -> usize {
    match dim {
        1 => size(x).0,
        2 => size(x).1,
        _ => x.shape()[dim - 1],
    }
}

/// The first-dimension length.
///
/// Panics: on a zero-rank array.
pub fn length<T>(x: &MArray<T>) -> usize {
    x.shape()[0]
}

/// The positions at which a boolean condition holds, wrapped unchanged from
/// the engine's index order (zero-based, flat).
///
/// ```
/// use marray::{find, MArray};
///
/// let x = MArray::from(vec![3., 1., 4., 1., 5.]);
/// assert_eq!(find(x.lt(3.)).to_vec(), vec![1, 3]);
/// ```
pub fn find(cond: Value<bool>) -> MArray<usize> {
    match cond {
        Value::Number(true) => MArray::from(vec![0]),
        Value::Number(false) => MArray::from(Vec::<usize>::new()),
        Value::Array(mask) => mask
            .iter()
            .enumerate()
            .filter_map(|(pos, &hit)| if hit { Some(pos) } else { None })
            .collect(),
    }
}

/// The source convention's notion of emptiness.
///
/// Absent values, empty text, empty collections, null match results, and
/// arrays with no elements are all empty.
pub trait IsEmpty {
    fn is_empty(&self) -> bool;
}

/// `true` iff the value is empty in the source convention's sense.
pub fn isempty<V: IsEmpty + ?Sized>(value: &V) -> bool {
    value.is_empty()
}

impl IsEmpty for str {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl IsEmpty for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl<V> IsEmpty for Option<V> {
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

impl<V> IsEmpty for [V] {
    fn is_empty(&self) -> bool {
        <[V]>::is_empty(self)
    }
}

impl<V> IsEmpty for Vec<V> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<K, V, S> IsEmpty for HashMap<K, V, S> {
    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl<T> IsEmpty for MArray<T> {
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> IsEmpty for Value<T> {
    fn is_empty(&self) -> bool {
        match self {
            Value::Number(_) => false,
            Value::Array(array) => array.len() == 0,
        }
    }
}

/// Open a file in mode `"r"`, `"w"`, `"a"` or `"r+"`.
///
/// The handle is caller-managed: close it explicitly with [`fclose`].
pub fn fopen(filename: &str, mode: &str) -> Result<File> {
    let file = match mode {
        "r" => OpenOptions::new().read(true).open(filename),
        "w" => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(filename),
        "a" => OpenOptions::new().append(true).create(true).open(filename),
        "r+" => OpenOptions::new().read(true).write(true).open(filename),
        other => return Err(Error::msg(format!("unsupported file mode {:?}", other))),
    };

    file.map_err(|_| Error::fatal(format!("File {} cannot be opened", filename)))
}

/// Close a file handle opened with [`fopen`].
pub fn fclose(fid: File) {
    drop(fid)
}

/// Format a diagnostic like [`sprintf`] and produce a fatal [`Error`].
///
/// The source convention terminated the process here; callers that still
/// want that behavior can chain [`Error::exit`]. Recoverable conditions are
/// distinguished with [`Error::is_fatal`].
pub fn error(format: &str, args: &[FmtArg]) -> Error {
    Error::fatal(sprintf(format, args))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn test_zeros_scalar() {
        assert_eq!(zeros(&[]), Value::Number(0.));
    }

    #[test]
    fn test_zeros_square() {
        let x = zeros(&[3]).into_array();
        assert_eq!(size(&x), (3, 3));
        assert!(x.iter().all(|&v| v == 0.));
    }

    #[test]
    fn test_zeros_row() {
        let x = zeros(&[1, 5]).into_array();
        assert_eq!(x.shape(), &[5]);
        assert_eq!(size(&x), (1, 5));
    }

    #[test]
    fn test_ones() {
        assert_eq!(ones(&[]), Value::Number(1.));
        let x = ones(&[2, 3]).into_array();
        assert_eq!(size(&x), (2, 3));
        assert!(x.iter().all(|&v| v == 1.));
    }

    #[test]
    fn test_rand_bounds() {
        let x = rand(&[2, 4]).into_array();
        assert_eq!(size(&x), (2, 4));
        assert!(x.iter().all(|&v| (0. ..1.).contains(&v)));
    }

    #[test]
    fn test_randn_shapes() {
        assert!(randn(&[]).as_number().is_some());
        assert_eq!(size(&randn(&[3]).into_array()), (3, 3));
        assert_eq!(size(&randn(&[1, 7]).into_array()), (1, 7));
    }

    #[test]
    fn test_size_of_matrix() {
        let x: MArray<f64> = MArray::from(vec![vec![1., 2., 3.], vec![4., 5., 6.]]);
        assert_eq!(size(&x), (2, 3));
        assert_eq!(size_along(&x, 1), 2);
        assert_eq!(size_along(&x, 2), 3);
    }

    #[test]
    fn test_length() {
        assert_eq!(length(&MArray::from(vec![1., 2., 3.])), 3);
        let x: MArray<f64> = MArray::from(vec![vec![1., 2., 3.], vec![4., 5., 6.]]);
        assert_eq!(length(&x), 2);
    }

    #[test]
    fn test_find() {
        let x = MArray::from(vec![3., 1., 4., 1., 5.]);
        assert_eq!(find(x.lt(3.)).to_vec(), vec![1, 3]);
        assert!(find(x.gt(10.)).is_empty());
    }

    #[test]
    fn test_find_scalar_condition() {
        let x = MArray::from(vec![2.]);
        assert_eq!(find(x.lt(3.)).to_vec(), vec![0]);
        assert!(find(x.gt(3.)).is_empty());
    }

    #[test]
    fn test_isempty() {
        assert!(isempty(&None::<String>));
        assert!(isempty(""));
        assert!(isempty(&Vec::<isize>::new()));
        assert!(isempty(&HashMap::<String, isize>::new()));
        assert!(isempty(&MArray::from(Vec::<f64>::new())));

        assert!(!isempty(&Some("x".to_string())));
        assert!(!isempty("x"));
        assert!(!isempty(&vec![1]));
        assert!(!isempty(&MArray::from(vec![1.])));
        assert!(!isempty(&Value::Number(0.)));
    }

    #[test]
    fn test_fopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        let mut fid = fopen(path, "w").unwrap();
        fid.write_all(b"first line\n").unwrap();
        fclose(fid);

        let mut fid = fopen(path, "r").unwrap();
        let mut contents = String::new();
        fid.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "first line\n");
    }

    #[test]
    fn test_fopen_missing_file() {
        let cause = fopen("/no/such/file", "r").unwrap_err();
        assert!(cause.is_fatal());
        assert_eq!(cause.to_string(), "File /no/such/file cannot be opened");
    }

    #[test]
    fn test_fopen_bad_mode() {
        let cause = fopen("whatever", "rw").unwrap_err();
        assert!(!cause.is_fatal());
    }

    #[test]
    fn test_error_formats() {
        let cause = error("expected %d, found %s", &[5.into(), "nothing".into()]);
        assert!(cause.is_fatal());
        assert_eq!(cause.to_string(), "expected 5, found nothing");
    }
}
