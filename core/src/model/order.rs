//! Evaluation order.
use crate::internal::*;
use crate::model::{Graph, Node};
use bit_set::BitSet;

/// Topological order over every node of the graph.
pub fn eval_order(model: &Graph) -> IrResult<Vec<usize>> {
    let targets = (0..model.nodes().len()).collect::<Vec<usize>>();
    eval_order_for_nodes(model.nodes(), &targets)
}

/// Computes an order in which every node needed by `targets` comes after all
/// of its inputs.
///
/// Depth first, starting from targets in the given order and visiting inputs
/// in slot order. When the graph is built by appending nodes after their
/// inputs, this is the identity order.
///
/// Fails with `CycleDetected`, naming the nodes on the loop, if one of the
/// targets depends on itself. No partial order is returned.
pub fn eval_order_for_nodes(nodes: &[Node], targets: &[usize]) -> IrResult<Vec<usize>> {
    let mut done = BitSet::with_capacity(nodes.len());
    let mut pending = BitSet::with_capacity(nodes.len());
    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());
    // (node, next input slot to visit)
    let mut stack: Vec<(usize, usize)> = vec![];
    for &target in targets {
        if target >= nodes.len() {
            return Err(IrError::UnknownInput { input: target, nodes: nodes.len() });
        }
        if done.contains(target) {
            continue;
        }
        stack.push((target, 0));
        pending.insert(target);
        while let Some((node, slot)) = stack.last_mut() {
            let node = *node;
            if let Some(&input) = nodes[node].inputs.get(*slot) {
                *slot += 1;
                if done.contains(input) {
                    continue;
                }
                if pending.contains(input) {
                    let start = stack.iter().position(|(n, _)| *n == input).unwrap_or(0);
                    let cycle = stack[start..].iter().map(|(n, _)| *n).collect();
                    return Err(IrError::CycleDetected { nodes: cycle });
                }
                pending.insert(input);
                stack.push((input, 0));
            } else {
                stack.pop();
                pending.remove(node);
                done.insert(node);
                order.push(node);
            }
        }
    }
    Ok(order)
}
