use crate::internal::*;
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Reducer {
    ArgMax(bool), // take last
    ArgMin(bool),
    Max,
    Mean,
    Min,
    Prod,
    Sum,
}

/// Reduce the input over `axes`. Reduced axes are kept with an extent of
/// one, or removed.
#[derive(Clone, Debug, new, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Reduce {
    pub axes: TVec<usize>,
    pub reducer: Reducer,
    pub keep_dims: bool,
}

impl Reduce {
    pub fn name(&self) -> Cow<'static, str> {
        format!("Reduce<{:?}>", self.reducer).into()
    }

    pub fn info(&self) -> Vec<String> {
        vec![format!("axes: {:?}", self.axes), format!("keep dims: {}", self.keep_dims)]
    }

    pub fn validate(&self) -> IrResult<()> {
        if !self.axes.iter().all_unique() {
            return Err(IrError::InvalidOperator {
                op: self.name().into_owned(),
                reason: format!("axes {:?} contain duplicates", self.axes),
            });
        }
        Ok(())
    }

    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        if let Some(&axis) = self.axes.iter().find(|&&axis| axis >= input.rank()) {
            return Err(IrError::AxisOutOfRange { axis, rank: input.rank() });
        }
        Ok(input
            .iter()
            .enumerate()
            .filter_map(|(ax, &d)| {
                if !self.axes.contains(&ax) {
                    Some(d)
                } else if self.keep_dims {
                    Some(1)
                } else {
                    None
                }
            })
            .collect())
    }
}
