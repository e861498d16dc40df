use crate::internal::*;

/// Stack inputs along one axis. Every other axis must match.
#[derive(Debug, Clone, new, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Concat {
    pub axis: usize,
}

impl Concat {
    pub fn output_shape(&self, inputs: &[&Shape]) -> IrResult<Shape> {
        let Some(first) = inputs.first() else {
            return Err(IrError::ArityMismatch {
                op: "Concat".into(),
                expected: "at least 1".into(),
                got: 0,
            });
        };
        let rank = first.rank();
        if self.axis >= rank {
            return Err(IrError::AxisOutOfRange { axis: self.axis, rank });
        }
        let mut extent = 0usize;
        for input in inputs {
            if input.rank() != rank {
                return Err(IrError::RankMismatch { expected: rank, got: input.rank() });
            }
            let off_axis_mismatch = (0..rank).any(|ax| ax != self.axis && input[ax] != first[ax]);
            if off_axis_mismatch {
                return Err(IrError::ShapeMismatch {
                    shapes: inputs.iter().map(|s| s.to_tvec()).collect(),
                });
            }
            extent = usize::checked_add(extent, input[self.axis])
                .ok_or(IrError::ExtentOverflow { axis: self.axis })?;
        }
        first.with_dim(self.axis, extent)
    }
}
