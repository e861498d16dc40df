use crate::internal::*;
use std::fmt;

/// A graph vertex: one operator, the ids of the nodes feeding it, and the
/// shape computed for its single output.
///
/// The shape is absent until an inference run succeeds. It is written by the
/// inference engine only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// node id in the graph, also its position in the node table
    pub id: usize,
    /// node name, for humans
    pub name: String,
    pub(crate) op: Operator,
    pub(crate) inputs: TVec<usize>,
    pub(crate) shape: Option<Shape>,
}

impl Node {
    pub(crate) fn new(id: usize, name: String, op: Operator, inputs: TVec<usize>) -> Node {
        Node { id, name, op, inputs, shape: None }
    }

    /// Access the node operator.
    pub fn op(&self) -> &Operator {
        &self.op
    }

    /// Ids of the nodes feeding this one, in slot order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Inferred output shape.
    pub fn shape(&self) -> IrResult<&Shape> {
        self.shape.as_ref().ok_or(IrError::NotYetInferred { node: self.id })
    }

    pub fn is_shaped(&self) -> bool {
        self.shape.is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "#{} \"{}\" {}", self.id, self.name, self.op)
    }
}
