//! Ops
use std::borrow::Cow;
use std::fmt;

use crate::internal::*;

pub mod array;
pub mod cnn;
pub mod element_wise;
pub mod matmul;
pub mod nn;

use self::array::{Concat, Reshape, Transpose};
use self::cnn::{Conv, Pool};
use self::element_wise::ElementWiseOp;
use self::matmul::MatMul;
use self::nn::{Reduce, Softmax};

/// Number of inputs an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, inputs: usize) -> bool {
        match self {
            Arity::Exactly(n) => inputs == *n,
            Arity::AtLeast(n) => inputs >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(fmt, "exactly {n}"),
            Arity::AtLeast(n) => write!(fmt, "at least {n}"),
        }
    }
}

/// Every computation the IR knows about.
///
/// This is a closed set: shape inference matches on it exhaustively, so
/// adding a kind means adding its shape rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    /// Graph input, shape supplied from outside.
    Source(Shape),
    /// Constant tensor (weights, bias), shape known at construction.
    Const(Shape),
    Conv(Conv),
    Pool(Pool),
    ElementWise(ElementWiseOp),
    Reshape(Reshape),
    Concat(Concat),
    MatMul(MatMul),
    Transpose(Transpose),
    Reduce(Reduce),
    Softmax(Softmax),
}

impl Operator {
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Operator::Source(_) => "Source".into(),
            Operator::Const(_) => "Const".into(),
            Operator::Conv(_) => "Conv".into(),
            Operator::Pool(pool) => pool.name(),
            Operator::ElementWise(op) => op.name(),
            Operator::Reshape(_) => "Reshape".into(),
            Operator::Concat(_) => "Concat".into(),
            Operator::MatMul(_) => "MatMul".into(),
            Operator::Transpose(_) => "Transpose".into(),
            Operator::Reduce(reduce) => reduce.name(),
            Operator::Softmax(_) => "Softmax".into(),
        }
    }

    /// Human readable parameters, one line per item.
    pub fn info(&self) -> Vec<String> {
        match self {
            Operator::Source(shape) | Operator::Const(shape) => vec![format!("shape: {shape}")],
            Operator::Conv(conv) => conv.info(),
            Operator::Pool(pool) => pool.pool_spec.info(),
            Operator::ElementWise(_) => vec![],
            Operator::Reshape(reshape) => reshape.info(),
            Operator::Concat(concat) => vec![format!("axis: {}", concat.axis)],
            Operator::MatMul(mm) => mm.info(),
            Operator::Transpose(t) => t.info(),
            Operator::Reduce(r) => r.info(),
            Operator::Softmax(s) => vec![format!("axis: {}", s.axis)],
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::Source(_) | Operator::Const(_) => Arity::Exactly(0),
            Operator::ElementWise(op) => Arity::Exactly(op.arity()),
            Operator::MatMul(_) => Arity::Exactly(2),
            Operator::Concat(_) => Arity::AtLeast(1),
            Operator::Conv(_)
            | Operator::Pool(_)
            | Operator::Reshape(_)
            | Operator::Transpose(_)
            | Operator::Reduce(_)
            | Operator::Softmax(_) => Arity::Exactly(1),
        }
    }

    /// Checks the operator parameters for internal consistency, independently
    /// of any input shape.
    pub fn validate(&self) -> IrResult<()> {
        match self {
            Operator::Conv(conv) => conv.validate(),
            Operator::Pool(pool) => pool.validate(),
            Operator::Transpose(t) => t.validate(),
            Operator::Reduce(r) => r.validate(),
            Operator::Source(_)
            | Operator::Const(_)
            | Operator::ElementWise(_)
            | Operator::Reshape(_)
            | Operator::Concat(_)
            | Operator::MatMul(_)
            | Operator::Softmax(_) => Ok(()),
        }
    }

    /// Output shape for the given input shapes.
    ///
    /// Pure: the result only depends on the operator parameters and the
    /// input shapes.
    pub fn output_shape(&self, inputs: &[&Shape]) -> IrResult<Shape> {
        match self {
            Operator::Source(shape) | Operator::Const(shape) => Ok(shape.clone()),
            Operator::Conv(conv) => conv.output_shape(args_1(self, inputs)?),
            Operator::Pool(pool) => pool.output_shape(args_1(self, inputs)?),
            Operator::ElementWise(op) => {
                if inputs.len() != op.arity() {
                    return Err(arity_error(self, inputs.len()));
                }
                op.output_shape(inputs)
            }
            Operator::Reshape(reshape) => reshape.output_shape(args_1(self, inputs)?),
            Operator::Concat(concat) => {
                if inputs.is_empty() {
                    return Err(arity_error(self, 0));
                }
                concat.output_shape(inputs)
            }
            Operator::MatMul(mm) => {
                let (a, b) = args_2(self, inputs)?;
                mm.output_shape(a, b)
            }
            Operator::Transpose(t) => t.output_shape(args_1(self, inputs)?),
            Operator::Reduce(r) => r.output_shape(args_1(self, inputs)?),
            Operator::Softmax(s) => s.output_shape(args_1(self, inputs)?),
        }
    }
}

fn arity_error(op: &Operator, got: usize) -> IrError {
    IrError::ArityMismatch { op: op.name().into_owned(), expected: op.arity().to_string(), got }
}

fn args_1<'s>(op: &Operator, inputs: &[&'s Shape]) -> IrResult<&'s Shape> {
    match inputs {
        [a] => Ok(*a),
        _ => Err(arity_error(op, inputs.len())),
    }
}

fn args_2<'s>(op: &Operator, inputs: &[&'s Shape]) -> IrResult<(&'s Shape, &'s Shape)> {
    match inputs {
        [a, b] => Ok((*a, *b)),
        _ => Err(arity_error(op, inputs.len())),
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.name())?;
        let info = self.info();
        if !info.is_empty() {
            write!(fmt, " ({})", info.join(", "))?;
        }
        Ok(())
    }
}

macro_rules! impl_into_operator {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Operator {
                fn from(op: $ty) -> Operator {
                    Operator::$variant(op)
                }
            }
        )*
    };
}

impl_into_operator!(
    Conv(Conv),
    Pool(Pool),
    ElementWise(ElementWiseOp),
    Reshape(Reshape),
    Concat(Concat),
    MatMul(MatMul),
    Transpose(Transpose),
    Reduce(Reduce),
    Softmax(Softmax),
);
