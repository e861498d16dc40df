//! Operators computing each output element from the elements at the same
//! position in their inputs.
use crate::internal::*;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementWiseOp {
    Relu,
    Sigmoid,
    Tanh,
    Neg,
    Abs,
    Exp,
    Quantize,
    Dequantize,
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl ElementWiseOp {
    pub fn name(&self) -> Cow<'static, str> {
        format!("{self:?}").into()
    }

    pub fn is_binary(&self) -> bool {
        use ElementWiseOp::*;
        matches!(self, Add | Sub | Mul | Div | Min | Max)
    }

    pub fn arity(&self) -> usize {
        if self.is_binary() { 2 } else { 1 }
    }

    /// All inputs must have the same shape, which is also the output shape.
    /// There is no broadcasting.
    pub fn output_shape(&self, inputs: &[&Shape]) -> IrResult<Shape> {
        let Some(first) = inputs.first() else {
            return Err(IrError::ArityMismatch {
                op: self.name().into_owned(),
                expected: format!("exactly {}", self.arity()),
                got: 0,
            });
        };
        if inputs.iter().any(|s| s != first) {
            return Err(IrError::ShapeMismatch {
                shapes: inputs.iter().map(|s| s.to_tvec()).collect(),
            });
        }
        Ok((*first).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity() {
        assert_eq!(ElementWiseOp::Relu.arity(), 1);
        assert_eq!(ElementWiseOp::Dequantize.arity(), 1);
        assert_eq!(ElementWiseOp::Max.arity(), 2);
    }

    #[test]
    fn same_shapes() {
        let s = Shape::from([2, 3]);
        assert_eq!(ElementWiseOp::Add.output_shape(&[&s, &s]), Ok(s.clone()));
    }

    #[test]
    fn no_broadcasting() {
        let a = Shape::from([2, 3]);
        let b = Shape::from([1, 3]);
        assert_eq!(
            ElementWiseOp::Mul.output_shape(&[&a, &b]),
            Err(IrError::ShapeMismatch { shapes: vec![tvec!(2, 3), tvec!(1, 3)] })
        );
    }
}
