use crate::internal::*;
use crate::model::{Graph, Node};

/// Extensions on Graph to explore and build graph models more easily.
pub trait ModelDsl {
    /// Find the lone precursor of a node, if applicable.
    fn single_prec(&self, id: usize) -> IrResult<Option<&Node>>;
    /// Find the count-th precursor of a node `id` in a chain of single tensor
    /// operation, if applicable.
    fn single_prec_at(&self, id: usize, count: usize) -> IrResult<Option<&Node>>;
    /// Find the lone succesor of a node, if applicable.
    fn single_succ(&self, id: usize) -> IrResult<Option<&Node>>;
    /// Find the count-th successor of a node `id` in a chain of single tensor
    /// operation, if applicable.
    fn single_succ_at(&self, id: usize, count: usize) -> IrResult<Option<&Node>>;

    /// Adds a single-input node consuming the last node of the graph.
    fn chain(&mut self, name: impl Into<String>, op: impl Into<Operator>) -> IrResult<usize>;

    /// Adds a single-input node consuming `input`.
    fn chain_after(
        &mut self,
        input: usize,
        name: impl Into<String>,
        op: impl Into<Operator>,
    ) -> IrResult<usize>;
}

impl ModelDsl for Graph {
    fn single_prec(&self, id: usize) -> IrResult<Option<&Node>> {
        let node = self.node(id)?;
        if node.inputs.len() != 1 {
            return Ok(None);
        }
        let prec = self.node(node.inputs[0])?;
        if self.successors(prec.id)?.len() != 1 {
            return Ok(None);
        }
        Ok(Some(prec))
    }

    fn single_prec_at(&self, id: usize, count: usize) -> IrResult<Option<&Node>> {
        let mut node = self.node(id)?;
        for _ in 0..count {
            if let Some(next) = self.single_prec(node.id)? {
                node = next
            } else {
                return Ok(None);
            }
        }
        Ok(Some(node))
    }

    fn single_succ(&self, id: usize) -> IrResult<Option<&Node>> {
        let succs = self.successors(id)?;
        if succs.len() != 1 {
            return Ok(None);
        }
        let succ = self.node(succs[0])?;
        if succ.inputs.len() != 1 {
            return Ok(None);
        }
        Ok(Some(succ))
    }

    fn single_succ_at(&self, id: usize, count: usize) -> IrResult<Option<&Node>> {
        let mut node = self.node(id)?;
        for _ in 0..count {
            if let Some(next) = self.single_succ(node.id)? {
                node = next
            } else {
                return Ok(None);
            }
        }
        Ok(Some(node))
    }

    fn chain(&mut self, name: impl Into<String>, op: impl Into<Operator>) -> IrResult<usize> {
        let Some(last) = self.len().checked_sub(1) else {
            return Err(IrError::UnknownInput { input: 0, nodes: 0 });
        };
        self.chain_after(last, name, op)
    }

    fn chain_after(
        &mut self,
        input: usize,
        name: impl Into<String>,
        op: impl Into<Operator>,
    ) -> IrResult<usize> {
        self.add_node(name, op, &[input])
    }
}
