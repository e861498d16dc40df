use crate::internal::*;
use crate::ops::cnn::PoolSpec;

/// Convolution. Weights are not modelled here: only the geometry and the
/// channel counts matter for shapes.
#[derive(Debug, Clone, new, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Conv {
    pub pool_spec: PoolSpec,
    pub output_channels: usize,
    pub groups: usize,
}

impl Conv {
    pub fn info(&self) -> Vec<String> {
        let mut info = self.pool_spec.info();
        info.push(format!("Output channels: {}, groups: {}", self.output_channels, self.groups));
        info
    }

    pub fn validate(&self) -> IrResult<()> {
        self.pool_spec.validate("Conv")?;
        if self.output_channels == 0 || self.groups == 0 {
            return Err(IrError::InvalidOperator {
                op: "Conv".into(),
                reason: format!(
                    "output channels ({}) and groups ({}) must be positive",
                    self.output_channels, self.groups
                ),
            });
        }
        if self.output_channels % self.groups != 0 {
            return Err(IrError::InvalidOperator {
                op: "Conv".into(),
                reason: format!(
                    "{} output channels can not be split in {} groups",
                    self.output_channels, self.groups
                ),
            });
        }
        Ok(())
    }

    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        let (input_shape, geo) = self.pool_spec.compute_geo(input)?;
        let channels = input_shape.c();
        if channels == 0 || channels % self.groups != 0 {
            return Err(IrError::ChannelMismatch { channels, groups: self.groups });
        }
        self.pool_spec.output_shape_for_geo(&input_shape, &geo, self.output_channels)
    }
}
