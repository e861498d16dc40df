use crate::internal::*;
use std::borrow::Cow;

use crate::ops::cnn::{kernel_field, ComputedPaddedDim, PaddingSpec};
use crate::ops::nn::{DataFormat, DataShape};

/// Window geometry shared by convolution and pooling.
#[derive(Debug, Clone, new, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSpec {
    pub data_format: DataFormat,
    pub kernel_shape: TVec<usize>,
    pub padding: PaddingSpec,
    pub dilations: Option<TVec<usize>>,
    pub strides: Option<TVec<usize>>,
}

impl PoolSpec {
    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.kernel_shape.len()
    }

    pub fn dilations(&self) -> Cow<'_, [usize]> {
        self.dilations
            .as_deref()
            .map_or_else(|| vec![1; self.kernel_shape.len()].into(), |d| d.into())
    }

    pub fn strides(&self) -> Cow<'_, [usize]> {
        self.strides
            .as_deref()
            .map_or_else(|| vec![1; self.kernel_shape.len()].into(), |d| d.into())
    }

    pub fn info(&self) -> Vec<String> {
        vec![
            format!("Data format: {:?}", self.data_format),
            format!(
                "Kernel shape:{:?} (strides:{:?}, padding:{:?}, dilations:{:?})",
                self.kernel_shape, self.strides, self.padding, self.dilations,
            ),
        ]
    }

    /// Every per-axis parameter has one entry per spatial axis, kernel,
    /// stride and dilation are positive, and each dilated kernel extent fits
    /// in a usize.
    pub fn validate(&self, op: &str) -> IrResult<()> {
        let invalid = |reason: String| IrError::InvalidOperator { op: op.to_string(), reason };
        let rank = self.rank();
        if rank == 0 {
            return Err(invalid("no spatial axis".to_string()));
        }
        if self.kernel_shape.contains(&0) {
            return Err(invalid(format!("kernel shape {:?} has a zero extent", self.kernel_shape)));
        }
        for (what, values) in [("strides", &self.strides), ("dilations", &self.dilations)] {
            if let Some(values) = values {
                if values.len() != rank {
                    return Err(invalid(format!(
                        "{} {what} for {rank} spatial axes",
                        values.len()
                    )));
                }
                if values.contains(&0) {
                    return Err(invalid(format!("{what} {values:?} contain a zero")));
                }
            }
        }
        for (axis, (&kernel, &dilation)) in
            self.kernel_shape.iter().zip(self.dilations().iter()).enumerate()
        {
            if kernel_field(kernel, dilation).is_none() {
                return Err(invalid(format!(
                    "kernel {kernel} dilated by {dilation} overflows on axis {axis}"
                )));
            }
        }
        if let Some(paddings) = self.padding.paddings() {
            if paddings.len() != rank {
                return Err(invalid(format!(
                    "{} paddings for {rank} spatial axes",
                    paddings.len()
                )));
            }
        }
        Ok(())
    }

    /// Interpret the input shape and resolve the padding of each spatial
    /// axis.
    pub fn compute_geo(
        &self,
        input_full_shape: &Shape,
    ) -> IrResult<(DataShape, TVec<ComputedPaddedDim>)> {
        let expected = self.data_format.rank_for(self.rank());
        if input_full_shape.rank() != expected {
            return Err(IrError::RankMismatch { expected, got: input_full_shape.rank() });
        }
        let input_shape = self.data_format.shape(input_full_shape.clone())?;
        let computed = self.padding.compute(
            input_shape.hw_dims(),
            &self.kernel_shape,
            &self.dilations(),
            &self.strides(),
        )?;
        Ok((input_shape, computed))
    }

    /// Output shape: batch passes through, channel becomes `output_channels`,
    /// spatial axes are windowed.
    pub fn output_shape(
        &self,
        input_full_shape: &Shape,
        output_channels: usize,
    ) -> IrResult<Shape> {
        let (input_shape, computed) = self.compute_geo(input_full_shape)?;
        self.output_shape_for_geo(&input_shape, &computed, output_channels)
    }

    /// Output shape from an already computed geometry.
    pub fn output_shape_for_geo(
        &self,
        input_shape: &DataShape,
        computed: &[ComputedPaddedDim],
        output_channels: usize,
    ) -> IrResult<Shape> {
        let spatial_dims = computed.iter().map(|d| d.output).collect::<TVec<usize>>();
        let oshape = self.data_format.from_n_c_hw(
            input_shape.n().unwrap_or(1),
            output_channels,
            &spatial_dims,
        )?;
        Ok(oshape.shape)
    }
}
