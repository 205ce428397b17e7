use std::ops::{RangeFrom, RangeFull, RangeInclusive};

use ndarray::{Slice, SliceInfoElem};

/// The reserved "last element along this dimension" sentinel.
///
/// Valid only as the `stop` of a span, where it is replaced by the dimension
/// length at translation time:
/// ```
/// use marray::{Idx, MArray, Value, END};
///
/// let x = MArray::from(vec![1., 3., 8., 9., 5.]);
/// assert_eq!(x.get(Idx::span(3, END)), Value::Array(MArray::from(vec![8., 9., 5.])));
/// ```
pub const END: isize = -1;

/// A one-based index expression for a single array dimension.
///
/// Both endpoints of a span are inclusive, and the span is written in the
/// source order `start:step:stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idx {
    /// A bare one-based position, selecting a single element.
    At(isize),
    /// Every position along the dimension (the `:` form).
    Full,
    /// An inclusive `start:step:stop` span; `stop` may be [`END`].
    Span {
        start: isize,
        step: isize,
        stop: isize,
    },
}

impl Idx {
    /// A bare one-based position.
    pub fn at(pos: isize) -> Self {
        Self::At(pos)
    }

    /// The inclusive span `start:stop` with an implicit step of one.
    pub fn span(start: isize, stop: isize) -> Self {
        Self::by(start, 1, stop)
    }

    /// The inclusive span `start:step:stop`, ascending or descending.
    pub fn by(start: isize, step: isize, stop: isize) -> Self {
        Self::Span { start, step, stop }
    }

    /// Translate into a zero-based, exclusive-stop [`Slice`] along a
    /// dimension of length `len`.
    ///
    /// A one-based inclusive stop of `b` is exactly a zero-based exclusive
    /// stop of `b`, so no stop arithmetic is needed for the ascending case.
    pub(crate) fn to_slice(self, len: usize) -> Slice {
        match self {
            Self::At(pos) => Slice::new(pos - 1, Some(pos), 1),
            Self::Full => Slice::new(0, Some(len as isize), 1),
            Self::Span { start, step, stop } => {
                let stop = if stop == END { len as isize } else { stop };
                let start = start - 1;
                if step > 0 {
                    // an overshot ascending span is empty, not an error
                    Slice::new(start, Some(stop.max(start)), step)
                } else {
                    // same numeric substitution: the stop stays an exclusive
                    // bound. ndarray walks a negative-step slice backwards
                    // from the end of its range, so that bound becomes the
                    // floor of the range and the walk starts at `start`.
                    let hi = start + 1;
                    Slice::new((stop + 1).min(hi), Some(hi), step)
                }
            }
        }
    }
}

impl From<isize> for Idx {
    fn from(pos: isize) -> Self {
        Self::At(pos)
    }
}

impl From<i32> for Idx {
    fn from(pos: i32) -> Self {
        Self::At(pos as isize)
    }
}

impl From<RangeInclusive<isize>> for Idx {
    fn from(range: RangeInclusive<isize>) -> Self {
        Self::span(*range.start(), *range.end())
    }
}

impl From<RangeInclusive<i32>> for Idx {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self::span(*range.start() as isize, *range.end() as isize)
    }
}

impl From<RangeFrom<isize>> for Idx {
    fn from(range: RangeFrom<isize>) -> Self {
        Self::span(range.start, END)
    }
}

impl From<RangeFrom<i32>> for Idx {
    fn from(range: RangeFrom<i32>) -> Self {
        Self::span(range.start as isize, END)
    }
}

impl From<RangeFull> for Idx {
    fn from(_: RangeFull) -> Self {
        Self::Full
    }
}

/// A complete index key: one [`Idx`] expression per array dimension.
///
/// Implemented for a single expression (or anything convertible to one, such
/// as `2`, `1..=3`, `2..` or `..`), for tuples of up to four expressions, and
/// for an explicit `Vec<Idx>`.
pub trait Key {
    fn into_specs(self) -> Vec<Idx>;
}

impl Key for Idx {
    fn into_specs(self) -> Vec<Idx> {
        vec![self]
    }
}

impl Key for isize {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for i32 {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for RangeInclusive<isize> {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for RangeInclusive<i32> {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for RangeFrom<isize> {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for RangeFrom<i32> {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for RangeFull {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.into()]
    }
}

impl Key for Vec<Idx> {
    fn into_specs(self) -> Vec<Idx> {
        self
    }
}

impl<A: Into<Idx>, B: Into<Idx>> Key for (A, B) {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.0.into(), self.1.into()]
    }
}

impl<A: Into<Idx>, B: Into<Idx>, C: Into<Idx>> Key for (A, B, C) {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.0.into(), self.1.into(), self.2.into()]
    }
}

impl<A: Into<Idx>, B: Into<Idx>, C: Into<Idx>, D: Into<Idx>> Key for (A, B, C, D) {
    fn into_specs(self) -> Vec<Idx> {
        vec![self.0.into(), self.1.into(), self.2.into(), self.3.into()]
    }
}

/// Translate a per-dimension key against `shape`.
///
/// Missing trailing dimensions get the full span, like a partial index; extra
/// expressions are passed through so the slicing call itself rejects them.
pub(crate) fn translate(specs: &[Idx], shape: &[usize]) -> Vec<SliceInfoElem> {
    let ndim = shape.len().max(specs.len());
    (0..ndim)
        .map(|axis| {
            let len = shape.get(axis).copied().unwrap_or(0);
            let spec = specs.get(axis).copied().unwrap_or(Idx::Full);
            SliceInfoElem::from(spec.to_slice(len))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_position() {
        assert_eq!(Idx::at(3).to_slice(10), Slice::new(2, Some(3), 1));
    }

    #[test]
    fn test_full() {
        assert_eq!(Idx::Full.to_slice(4), Slice::new(0, Some(4), 1));
    }

    #[test]
    fn test_span() {
        assert_eq!(Idx::span(2, 5).to_slice(10), Slice::new(1, Some(5), 1));
    }

    #[test]
    fn test_span_to_end() {
        assert_eq!(Idx::span(3, END).to_slice(7), Slice::new(2, Some(7), 1));
    }

    #[test]
    fn test_stepped_span() {
        assert_eq!(Idx::by(1, 2, 9).to_slice(10), Slice::new(0, Some(9), 2));
    }

    #[test]
    fn test_descending_span() {
        // the stop keeps the same numeric substitution as the ascending case,
        // so 10:-2:2 walks the zero-based indices 9, 7, 5, 3 — ndarray reads
        // that as the range [3, 10) stepped by -2 from its end
        assert_eq!(Idx::by(10, -2, 2).to_slice(10), Slice::new(3, Some(10), -2));
    }

    #[test]
    fn test_empty_ascending_span() {
        assert_eq!(Idx::span(5, 2).to_slice(10), Slice::new(4, Some(4), 1));
    }

    #[test]
    fn test_empty_descending_span() {
        assert_eq!(Idx::by(2, -1, 5).to_slice(10), Slice::new(2, Some(2), -1));
    }

    #[test]
    fn test_range_syntax() {
        assert_eq!(Idx::from(4), Idx::At(4));
        assert_eq!(Idx::from(1..=3), Idx::span(1, 3));
        assert_eq!(Idx::from(2..), Idx::span(2, END));
        assert_eq!(Idx::from(..), Idx::Full);
    }

    #[test]
    fn test_partial_key() {
        let elems = translate(&[Idx::At(1)], &[2, 3]);
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[1], SliceInfoElem::from(Slice::new(0, Some(3), 1)));
    }
}
