use crate::internal::*;

#[derive(Debug, Clone, Copy, new, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Softmax {
    pub axis: usize,
}

impl Softmax {
    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        input.dim(self.axis)?;
        Ok(input.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_preserved() {
        assert_eq!(Softmax::new(1).output_shape(&[2, 10].into()), Ok([2, 10].into()));
        assert_eq!(
            Softmax::new(2).output_shape(&[2, 10].into()),
            Err(IrError::AxisOutOfRange { axis: 2, rank: 2 })
        );
    }
}
