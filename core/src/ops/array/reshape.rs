use crate::internal::*;

/// Reinterpret the input with a new shape of the same volume.
#[derive(Debug, Clone, new, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Reshape {
    pub shape: Shape,
}

impl Reshape {
    pub fn info(&self) -> Vec<String> {
        vec![format!("to shape: {}", self.shape)]
    }

    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        let volume = input.volume();
        if volume.is_none() || volume != self.shape.volume() {
            return Err(IrError::ElementCountMismatch {
                from: input.to_tvec(),
                to: self.shape.to_tvec(),
            });
        }
        Ok(self.shape.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_volume() {
        let op = Reshape::new([4, 6].into());
        assert_eq!(op.output_shape(&[2, 3, 4].into()), Ok([4, 6].into()));
    }

    #[test]
    fn volume_mismatch() {
        let op = Reshape::new([5, 5].into());
        assert_eq!(
            op.output_shape(&[2, 3, 4].into()),
            Err(IrError::ElementCountMismatch { from: tvec!(2, 3, 4), to: tvec!(5, 5) })
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn huge_source() {
        let op = Reshape::new([4].into());
        assert_eq!(
            op.output_shape(&[1 << 40, 1 << 40].into()),
            Err(IrError::ElementCountMismatch { from: tvec!(1 << 40, 1 << 40), to: tvec!(4) })
        );
        let op = Reshape::new([1 << 40, 1 << 40].into());
        assert!(op.output_shape(&[1 << 40, 1 << 40].into()).is_err());
    }

    #[test]
    fn to_scalar() {
        let op = Reshape::new(Shape::scalar());
        assert_eq!(op.output_shape(&[1, 1].into()), Ok(Shape::scalar()));
    }
}
