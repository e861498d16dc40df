use crate::internal::*;

/// How the spatial axes of a windowed operator are padded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingSpec {
    /// One padding per spatial axis, output rounded down.
    Explicit(TVec<Padding>),
    /// One padding per spatial axis, output rounded up (pooling "ceil mode").
    ExplicitCeil(TVec<Padding>),
    #[default]
    Valid,
    SameUpper,
    SameLower,
}

use PaddingSpec::*;

/// Geometry of one spatial axis once padding is resolved.
#[derive(Debug, Clone, new, PartialEq, Eq, Hash)]
pub struct ComputedPaddedDim {
    pub input: usize,
    pub output: usize,
    pub padding: Padding,
}

/// Extent covered by a dilated kernel, `None` if it does not fit in a
/// usize.
#[inline]
pub fn kernel_field(kernel: usize, dilation: usize) -> Option<usize> {
    kernel.checked_sub(1)?.checked_mul(dilation)?.checked_add(1)
}

impl PaddingSpec {
    pub fn explicit(paddings: impl IntoIterator<Item = Padding>) -> PaddingSpec {
        Explicit(paddings.into_iter().collect())
    }

    /// Explicit per-axis paddings, if any.
    pub fn paddings(&self) -> Option<&[Padding]> {
        match self {
            Explicit(p) | ExplicitCeil(p) => Some(p),
            Valid | SameUpper | SameLower => None,
        }
    }

    /// Is the axis left unpadded whatever its extent?
    pub fn valid_dim(&self, d: usize) -> bool {
        match self {
            Valid => true,
            Explicit(p) | ExplicitCeil(p) => p.get(d).is_some_and(|p| p.is_zero()),
            SameUpper | SameLower => false,
        }
    }

    pub fn compute(
        &self,
        input_spatial_shape: &[usize],
        kernel_spatial_shape: &[usize],
        dilations: &[usize],
        strides: &[usize],
    ) -> IrResult<TVec<ComputedPaddedDim>> {
        (0..input_spatial_shape.len())
            .map(|d| {
                self.compute_one(
                    d,
                    input_spatial_shape[d],
                    kernel_spatial_shape[d],
                    dilations[d],
                    strides[d],
                )
            })
            .collect()
    }

    pub fn compute_one(
        &self,
        axis: usize,
        input: usize,
        kernel: usize,
        dilation: usize,
        stride: usize,
    ) -> IrResult<ComputedPaddedDim> {
        let field = kernel_field(kernel, dilation).ok_or_else(|| IrError::InvalidOperator {
            op: "Window".into(),
            reason: format!("kernel {kernel} dilated by {dilation} overflows on axis {axis}"),
        })?;
        match self {
            Valid => Self::explicit_floor(axis, input, field, stride, Padding::zero()),
            Explicit(paddings) => {
                Self::explicit_floor(axis, input, field, stride, Self::axis(paddings, axis)?)
            }
            ExplicitCeil(paddings) => {
                Self::explicit_ceil(axis, input, field, stride, Self::axis(paddings, axis)?)
            }
            SameUpper => Self::same(axis, input, field, stride, true),
            SameLower => Self::same(axis, input, field, stride, false),
        }
    }

    fn axis(paddings: &[Padding], axis: usize) -> IrResult<Padding> {
        paddings.get(axis).copied().ok_or(IrError::AxisOutOfRange { axis, rank: paddings.len() })
    }

    /// Padded extent. Two paddings and an extent all fit in a u128.
    #[inline]
    fn padded(input: usize, padding: Padding) -> u128 {
        input as u128 + padding.before() as u128 + padding.after() as u128
    }

    // padded < field: floor((padded - field) / stride) + 1 is zero or negative
    fn negative_extent(
        axis: usize,
        input: usize,
        padded: u128,
        field: usize,
        stride: usize,
    ) -> IrError {
        let missing = (field as u128 - padded).div_ceil(stride as u128);
        let extent = 1 - missing as i128;
        IrError::NegativeOutputExtent {
            axis,
            input,
            padded: usize::try_from(padded).unwrap_or(usize::MAX),
            kernel_field: field,
            extent: i64::try_from(extent).unwrap_or(i64::MIN),
        }
    }

    fn output(axis: usize, output: u128) -> IrResult<usize> {
        usize::try_from(output).map_err(|_| IrError::ExtentOverflow { axis })
    }

    // output = floor((input + before + after - kernel_field) / stride) + 1
    fn explicit_floor(
        axis: usize,
        input: usize,
        field: usize,
        stride: usize,
        padding: Padding,
    ) -> IrResult<ComputedPaddedDim> {
        let padded = Self::padded(input, padding);
        if padded < field as u128 {
            return Err(Self::negative_extent(axis, input, padded, field, stride));
        }
        let output = (padded - field as u128) / stride as u128 + 1;
        Ok(ComputedPaddedDim::new(input, Self::output(axis, output)?, padding))
    }

    // output = ceil((input + before + after - kernel_field) / stride) + 1
    fn explicit_ceil(
        axis: usize,
        input: usize,
        field: usize,
        stride: usize,
        padding: Padding,
    ) -> IrResult<ComputedPaddedDim> {
        let padded = Self::padded(input, padding);
        if padded < field as u128 {
            return Err(Self::negative_extent(axis, input, padded, field, stride));
        }
        let stride = stride as u128;
        let mut output = (padded - field as u128).div_ceil(stride) + 1;
        // ensure that the last window starts inside the image or the leading padding
        if (output - 1) * stride >= input as u128 + padding.before() as u128 {
            output -= 1;
        }
        if output == 0 {
            return Err(IrError::NegativeOutputExtent {
                axis,
                input,
                padded: usize::try_from(padded).unwrap_or(usize::MAX),
                kernel_field: field,
                extent: 0,
            });
        }
        Ok(ComputedPaddedDim::new(input, Self::output(axis, output)?, padding))
    }

    // output = ceil(input / stride), the padding is whatever it takes
    fn same(
        axis: usize,
        input: usize,
        field: usize,
        stride: usize,
        upper: bool,
    ) -> IrResult<ComputedPaddedDim> {
        let output = input.div_ceil(stride);
        if output == 0 {
            return Err(IrError::NegativeOutputExtent {
                axis,
                input,
                padded: input,
                kernel_field: field,
                extent: 0,
            });
        }
        // the last window starts before the end of the input
        let covered = input - (output - 1) * stride;
        let pad = field.saturating_sub(covered);
        let lower_pad = pad / 2;
        let higher_pad = pad - lower_pad;
        let (before, after) = if upper { (lower_pad, higher_pad) } else { (higher_pad, lower_pad) };
        Ok(ComputedPaddedDim::new(input, output, (before, after).into()))
    }
}
