use crate::errors::{IrError, IrResult};
use std::fmt;

/// Asymmetric extension of one tensor axis, in elements.
///
/// Padding is never negative: there is no cropping semantics here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    before: usize,
    after: usize,
}

impl Padding {
    /// Checked constructor, for values coming from outside (signed model
    /// attributes, user input).
    pub fn new(before: i64, after: i64) -> IrResult<Padding> {
        match (usize::try_from(before), usize::try_from(after)) {
            (Ok(b), Ok(a)) => Ok(Padding { before: b, after: a }),
            _ => Err(IrError::InvalidPadding { before, after }),
        }
    }

    pub fn zero() -> Padding {
        Padding::default()
    }

    pub fn symmetric(pad: usize) -> Padding {
        Padding { before: pad, after: pad }
    }

    #[inline]
    pub fn before(&self) -> usize {
        self.before
    }

    #[inline]
    pub fn after(&self) -> usize {
        self.after
    }

    /// Total padding, `None` if it does not fit in a usize.
    #[inline]
    pub fn sum(&self) -> Option<usize> {
        self.before.checked_add(self.after)
    }

    pub fn is_zero(&self) -> bool {
        self.before == 0 && self.after == 0
    }
}

impl From<(usize, usize)> for Padding {
    fn from((before, after): (usize, usize)) -> Padding {
        Padding { before, after }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.before, self.after)
    }
}
