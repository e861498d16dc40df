use crate::internal::*;
use crate::ops::cnn::PoolSpec;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolKind {
    #[default]
    Max,
    Avg,
    Sum,
}

/// Max, average or sum pooling. The channel axis passes through.
#[derive(Debug, Clone, new, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Pool {
    pub pool_spec: PoolSpec,
    pub kind: PoolKind,
}

impl Pool {
    pub fn name(&self) -> Cow<'static, str> {
        match self.kind {
            PoolKind::Max => "MaxPool",
            PoolKind::Avg => "AvgPool",
            PoolKind::Sum => "SumPool",
        }
        .into()
    }

    pub fn validate(&self) -> IrResult<()> {
        self.pool_spec.validate(&self.name())
    }

    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        let (input_shape, geo) = self.pool_spec.compute_geo(input)?;
        self.pool_spec.output_shape_for_geo(&input_shape, &geo, input_shape.c())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::cnn::PaddingSpec;
    use crate::ops::nn::DataFormat;

    #[test]
    fn max_pool_2x2() {
        let strides = Some(tvec!(2, 2));
        let spec = PoolSpec::new(DataFormat::NHWC, tvec!(2, 2), PaddingSpec::Valid, None, strides);
        let pool = Pool::new(spec, PoolKind::Max);
        assert_eq!(pool.name(), "MaxPool");
        assert_eq!(pool.output_shape(&[1, 8, 6, 5].into()), Ok([1, 4, 3, 5].into()));
    }

    #[test]
    fn ceil_mode_keeps_partial_window() {
        let spec = |padding| {
            PoolSpec::new(DataFormat::CHW, tvec!(3), padding, None, Some(tvec!(2)))
        };
        let floor = Pool::new(spec(PaddingSpec::Valid), PoolKind::Avg);
        let ceil_padding = PaddingSpec::ExplicitCeil(tvec!(Padding::zero()));
        let ceil = Pool::new(spec(ceil_padding), PoolKind::Avg);
        assert_eq!(floor.output_shape(&[4, 8].into()), Ok([4, 3].into()));
        assert_eq!(ceil.output_shape(&[4, 8].into()), Ok([4, 4].into()));
    }

    #[test]
    fn kernel_larger_than_input() {
        let pool = Pool::new(
            PoolSpec::new(DataFormat::CHW, tvec!(7), PaddingSpec::Valid, None, None),
            PoolKind::Sum,
        );
        assert!(matches!(
            pool.output_shape(&[1, 5].into()),
            Err(IrError::NegativeOutputExtent { extent: -1, .. })
        ));
    }
}
