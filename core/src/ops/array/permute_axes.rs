use crate::internal::*;

/// Axis permutation: output axis `i` is input axis `perm[i]`.
#[derive(Debug, Clone, new, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Transpose {
    pub perm: TVec<usize>,
}

impl Transpose {
    pub fn info(&self) -> Vec<String> {
        vec![format!("perm: {:?}", self.perm)]
    }

    /// `perm` must contain each of `0..perm.len()` exactly once.
    pub fn validate(&self) -> IrResult<()> {
        let mut sorted = self.perm.clone();
        sorted.sort_unstable();
        if sorted.iter().enumerate().any(|(ix, &axis)| ix != axis) {
            return Err(IrError::InvalidOperator {
                op: "Transpose".into(),
                reason: format!("{:?} is not a permutation", self.perm),
            });
        }
        Ok(())
    }

    pub fn output_shape(&self, input: &Shape) -> IrResult<Shape> {
        if input.rank() != self.perm.len() {
            return Err(IrError::RankMismatch { expected: self.perm.len(), got: input.rank() });
        }
        Ok(self.perm.iter().map(|&axis| input[axis]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nchw_to_nhwc() {
        let op = Transpose::new(tvec!(0, 2, 3, 1));
        assert!(op.validate().is_ok());
        assert_eq!(op.output_shape(&[1, 3, 32, 24].into()), Ok([1, 32, 24, 3].into()));
    }

    #[test]
    fn not_a_permutation() {
        assert!(Transpose::new(tvec!(0, 0)).validate().is_err());
        assert!(Transpose::new(tvec!(1, 2)).validate().is_err());
    }

    #[test]
    fn rank_mismatch() {
        assert_eq!(
            Transpose::new(tvec!(1, 0)).output_shape(&[2, 3, 4].into()),
            Err(IrError::RankMismatch { expected: 2, got: 3 })
        );
    }
}
