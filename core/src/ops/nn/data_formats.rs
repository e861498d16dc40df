use crate::internal::*;
use std::ops::Range;

/// Where batch (N), channel (C) and spatial (HW...) axes sit in a tensor
/// fed to a windowed operator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum DataFormat {
    #[default]
    NCHW,
    NHWC,
    CHW,
    HWC,
}

impl DataFormat {
    pub fn has_n(&self) -> bool {
        matches!(self, DataFormat::NCHW | DataFormat::NHWC)
    }

    pub fn c_is_last(&self) -> bool {
        matches!(self, DataFormat::NHWC | DataFormat::HWC)
    }

    /// Rank of a tensor with `hw_rank` spatial axes in this format.
    pub fn rank_for(&self, hw_rank: usize) -> usize {
        hw_rank + 1 + self.has_n() as usize
    }

    /// Interpret a full tensor shape in this format. Fails with
    /// `RankMismatch` if there is no room for the channel axis and at least
    /// one spatial axis.
    pub fn shape(&self, shape: impl Into<Shape>) -> IrResult<DataShape> {
        let shape = shape.into();
        if shape.rank() < self.rank_for(1) {
            return Err(IrError::RankMismatch { expected: self.rank_for(1), got: shape.rank() });
        }
        Ok(DataShape { fmt: *self, shape })
    }

    /// Assemble a full shape from its batch, channel and spatial parts. The
    /// batch extent is ignored for formats without N axis.
    pub fn from_n_c_hw(&self, n: usize, c: usize, hw: &[usize]) -> IrResult<DataShape> {
        let mut me: TVec<usize> = tvec!();
        if self.has_n() {
            me.push(n);
        }
        if !self.c_is_last() {
            me.push(c);
        }
        me.extend(hw.iter().copied());
        if self.c_is_last() {
            me.push(c);
        }
        self.shape(me)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataShape {
    pub fmt: DataFormat,
    pub shape: Shape,
}

impl DataShape {
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    #[inline]
    pub fn hw_rank(&self) -> usize {
        self.rank() - 1 - self.n_axis().is_some() as usize
    }

    #[inline]
    pub fn n_axis(&self) -> Option<usize> {
        if self.fmt.has_n() { Some(0) } else { None }
    }

    #[inline]
    pub fn c_axis(&self) -> usize {
        match self.fmt {
            DataFormat::NHWC | DataFormat::HWC => self.rank() - 1,
            DataFormat::NCHW => 1,
            DataFormat::CHW => 0,
        }
    }

    #[inline]
    pub fn h_axis(&self) -> usize {
        match self.fmt {
            DataFormat::HWC => 0,
            DataFormat::NHWC | DataFormat::CHW => 1,
            DataFormat::NCHW => 2,
        }
    }

    #[inline]
    pub fn hw_axes(&self) -> Range<usize> {
        self.h_axis()..self.h_axis() + self.hw_rank()
    }

    #[inline]
    pub fn hw_dims(&self) -> &[usize] {
        &self.shape[self.hw_axes()]
    }

    #[inline]
    pub fn n(&self) -> Option<usize> {
        self.n_axis().map(|axis| self.shape[axis])
    }

    #[inline]
    pub fn c(&self) -> usize {
        self.shape[self.c_axis()]
    }
}
