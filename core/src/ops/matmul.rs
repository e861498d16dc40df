use crate::internal::*;

/// Rank-2 matrix product: `[m, k] x [k, n] -> [m, n]`, each operand possibly
/// transposed first.
#[derive(Debug, Clone, Copy, new, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MatMul {
    pub transpose_a: bool,
    pub transpose_b: bool,
}

impl MatMul {
    pub fn info(&self) -> Vec<String> {
        if self.transpose_a || self.transpose_b {
            vec![format!("transpose a: {}, b: {}", self.transpose_a, self.transpose_b)]
        } else {
            vec![]
        }
    }

    pub fn output_shape(&self, a: &Shape, b: &Shape) -> IrResult<Shape> {
        for s in [a, b] {
            if s.rank() != 2 {
                return Err(IrError::RankMismatch { expected: 2, got: s.rank() });
            }
        }
        let (m, ka) = if self.transpose_a { (a[1], a[0]) } else { (a[0], a[1]) };
        let (kb, n) = if self.transpose_b { (b[1], b[0]) } else { (b[0], b[1]) };
        if ka != kb {
            return Err(IrError::ShapeMismatch { shapes: vec![a.to_tvec(), b.to_tvec()] });
        }
        Ok([m, n].into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain() {
        let mm = MatMul::default();
        assert_eq!(mm.output_shape(&[2, 3].into(), &[3, 5].into()), Ok([2, 5].into()));
        assert!(matches!(
            mm.output_shape(&[2, 3].into(), &[4, 5].into()),
            Err(IrError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn transposed() {
        let mm = MatMul::new(true, true);
        assert_eq!(mm.output_shape(&[3, 2].into(), &[5, 3].into()), Ok([2, 5].into()));
    }

    #[test]
    fn rank() {
        assert_eq!(
            MatMul::default().output_shape(&[1, 2, 3].into(), &[3, 5].into()),
            Err(IrError::RankMismatch { expected: 2, got: 3 })
        );
    }
}
