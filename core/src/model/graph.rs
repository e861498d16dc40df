use crate::infer::{Completed, InferenceEngine, InferenceFailure, InferenceState};
use crate::internal::*;
use crate::model::Node;

use std::borrow::Cow;
use std::fmt;

/// Main model class.
///
/// The graph owns its nodes in a table indexed by node id. Edges are stored
/// on the consumer side, as the list of node ids feeding each node. Every id
/// referenced as an input exists in the table: insertion and rewiring check
/// it eagerly.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// all nodes in the model
    nodes: Vec<Node>,
    /// where the last inference run left the graph
    state: InferenceState,
}

impl Graph {
    /// Adds a node computing `op` from the outputs of `inputs`.
    ///
    /// Fails with `InvalidOperator` if the operator parameters are
    /// inconsistent, `UnknownInput` if an input id is not in the graph, and
    /// `ArityMismatch` if the operator does not accept that many inputs. The
    /// graph is left untouched on failure.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        op: impl Into<Operator>,
        inputs: &[usize],
    ) -> IrResult<usize> {
        let op = op.into();
        op.validate()?;
        for &input in inputs {
            self.check_node_id(input)?;
        }
        let arity = op.arity();
        if !arity.accepts(inputs.len()) {
            return Err(IrError::ArityMismatch {
                op: op.name().into_owned(),
                expected: arity.to_string(),
                got: inputs.len(),
            });
        }
        self.invalidate();
        let id = self.nodes.len();
        let name = name.into();
        trace!("adding node #{id} \"{name}\" {op}");
        self.nodes.push(Node::new(id, name, op, inputs.into()));
        Ok(id)
    }

    /// Adds a graph input with its externally supplied shape.
    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
    ) -> IrResult<usize> {
        self.add_node(name, Operator::Source(shape.into()), &[])
    }

    /// Adds a constant (weights, bias...) of known shape.
    pub fn add_const(
        &mut self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
    ) -> IrResult<usize> {
        self.add_node(name, Operator::Const(shape.into()), &[])
    }

    /// Connect `input` to the `slot`-th input of `node`, replacing the
    /// previous edge.
    ///
    /// This is the only way to make a graph cyclic: it is accepted here and
    /// rejected by ordering and inference.
    pub fn set_input(&mut self, node: usize, slot: usize, input: usize) -> IrResult<()> {
        self.check_node_id(node)?;
        self.check_node_id(input)?;
        let succ = &mut self.nodes[node];
        let Some(edge) = succ.inputs.get_mut(slot) else {
            return Err(IrError::ArityMismatch {
                op: succ.op.name().into_owned(),
                expected: succ.op.arity().to_string(),
                got: slot + 1,
            });
        };
        *edge = input;
        self.invalidate();
        Ok(())
    }

    /// Replace the shape of a graph input.
    pub fn set_source_shape(&mut self, node: usize, shape: impl Into<Shape>) -> IrResult<()> {
        self.check_node_id(node)?;
        match &mut self.nodes[node].op {
            Operator::Source(s) => *s = shape.into(),
            other => {
                return Err(IrError::InvalidOperator {
                    op: other.name().into_owned(),
                    reason: format!("node #{node} is not a graph input"),
                });
            }
        }
        self.invalidate();
        Ok(())
    }

    fn check_node_id(&self, id: usize) -> IrResult<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(IrError::UnknownInput { input: id, nodes: self.nodes.len() })
        }
    }

    /// Drops every inferred shape: they are stale as soon as the graph changes.
    fn invalidate(&mut self) {
        for node in &mut self.nodes {
            node.shape = None;
        }
        self.state = InferenceState::NotStarted;
    }

    // nodes

    /// Find a node by its id.
    pub fn node(&self, id: usize) -> IrResult<&Node> {
        self.check_node_id(id)?;
        Ok(&self.nodes[id])
    }

    /// Access the nodes table.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_id_by_name(&self, name: &str) -> Option<usize> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Find a node by its name.
    pub fn node_by_name(&self, name: impl AsRef<str>) -> Option<&Node> {
        self.node_id_by_name(name.as_ref()).map(|id| &self.nodes[id])
    }

    /// Nodes consuming the output of `id`, in id order. A node reading the
    /// same producer twice is listed once.
    pub fn successors(&self, id: usize) -> IrResult<TVec<usize>> {
        self.check_node_id(id)?;
        Ok(self.nodes.iter().filter(|n| n.inputs.contains(&id)).map(|n| n.id).collect())
    }

    /// Graph inputs: nodes computing a `Source` operator.
    pub fn input_nodes(&self) -> TVec<usize> {
        self.nodes.iter().filter(|n| matches!(n.op, Operator::Source(_))).map(|n| n.id).collect()
    }

    /// Guess outputs from the topology: nodes with no successors.
    pub fn output_nodes(&self) -> TVec<usize> {
        let mut consumed = bit_set::BitSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            for &input in &node.inputs {
                consumed.insert(input);
            }
        }
        (0..self.nodes.len()).filter(|n| !consumed.contains(*n)).collect()
    }

    /// Inferred output shape of a node. Fails with `NotYetInferred` until an
    /// inference run completes.
    pub fn shape_of(&self, id: usize) -> IrResult<&Shape> {
        self.node(id)?.shape()
    }

    // order

    /// Nodes in an order where each one comes after all its inputs.
    ///
    /// The order is fully computed (and checked for cycles) before the
    /// iterator is handed out: on `CycleDetected`, nothing is yielded.
    pub fn topological_order(&self) -> IrResult<impl Iterator<Item = usize> + '_> {
        Ok(self.eval_order()?.into_iter())
    }

    /// Computes an evaluation order for the whole graph.
    pub fn eval_order(&self) -> IrResult<Vec<usize>> {
        super::order::eval_order(self)
    }

    // inference

    /// Where the last inference run left the graph.
    pub fn state(&self) -> &InferenceState {
        &self.state
    }

    /// Shape every node with a default engine.
    pub fn infer(&mut self) -> Result<Completed, InferenceFailure> {
        InferenceEngine::default().run(self)
    }

    pub(crate) fn set_state(&mut self, state: InferenceState) {
        self.state = state;
    }

    /// Publish a complete shape table. Either every node gets its shape, or
    /// none does.
    pub(crate) fn publish_shapes(&mut self, shapes: Vec<Shape>) {
        debug_assert_eq!(shapes.len(), self.nodes.len());
        for (node, shape) in self.nodes.iter_mut().zip(shapes) {
            node.shape = Some(shape);
        }
    }

    pub(crate) fn clear_shapes(&mut self) {
        for node in &mut self.nodes {
            node.shape = None;
        }
    }

    // misc

    /// generates a name for a new node in the model that will not conflict (by suffixing with a
    /// dot and number)
    pub fn unique_name<'n>(&self, prefix: impl Into<Cow<'n, str>>) -> Cow<'n, str> {
        let prefix = prefix.into();
        if self.nodes.iter().all(|n| n.name != *prefix) {
            return prefix;
        }
        for i in 1.. {
            let s = format!("{prefix}.{i}");
            if self.nodes.iter().all(|n| n.name != s) {
                return Cow::Owned(s);
            }
        }
        unreachable!();
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for node in &self.nodes {
            let input_1 = node.inputs.first().map(|o| format!("#{o}")).unwrap_or_default();
            let input_2 = node.inputs.get(1).map(|o| format!("#{o}")).unwrap_or_default();
            let shape = node.shape.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "?".into());
            writeln!(
                fmt,
                "{:5} | {:6} {:6} | {:12} {:30} => {}",
                node.id,
                input_1,
                input_2,
                node.op.name(),
                node.name,
                shape,
            )?;
            if node.inputs.len() > 2 {
                writeln!(
                    fmt,
                    "      |   * inputs: {}",
                    node.inputs.iter().map(|s| format!("#{s}")).join(", ")
                )?;
            }
        }
        let outputs = self.output_nodes().iter().map(|o| format!("#{o}")).join(", ");
        writeln!(fmt, "outputs: {outputs}")?;
        Ok(())
    }
}
