use crate::errors::{IrError, IrResult};
use crate::TVec;
use itertools::Itertools;
use std::fmt;
use std::ops::Deref;

/// Axis extents of a tensor, outermost first.
///
/// Shapes are values: every transformation builds a new one.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape(TVec<usize>);

impl Shape {
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Shape {
        Shape(dims.into_iter().collect())
    }

    pub fn scalar() -> Shape {
        Shape(tvec!())
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Extent of `axis`, or `AxisOutOfRange`.
    pub fn dim(&self, axis: usize) -> IrResult<usize> {
        self.0.get(axis).copied().ok_or(IrError::AxisOutOfRange { axis, rank: self.rank() })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Total element count. One for a scalar, `None` if it does not fit in a
    /// usize.
    pub fn volume(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    pub fn to_tvec(&self) -> TVec<usize> {
        self.0.clone()
    }

    /// Same shape with one axis replaced.
    pub fn with_dim(&self, axis: usize, extent: usize) -> IrResult<Shape> {
        let mut dims = self.0.clone();
        *dims.get_mut(axis).ok_or(IrError::AxisOutOfRange { axis, rank: self.rank() })? = extent;
        Ok(Shape(dims))
    }
}

impl Deref for Shape {
    type Target = [usize];
    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl AsRef<[usize]> for Shape {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Shape {
        Shape(dims.into())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Shape {
        Shape(dims.into_iter().collect())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Shape {
        Shape(dims.into())
    }
}

impl From<TVec<usize>> for Shape {
    fn from(dims: TVec<usize>) -> Shape {
        Shape(dims)
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Shape {
        Shape(iter.into_iter().collect())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("x"))
    }
}
