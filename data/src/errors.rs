//! Error taxonomy of the IR.
use crate::TVec;
use itertools::Itertools;
use thiserror::Error;

/// Everything that can go wrong while building, ordering or shaping a graph.
///
/// Construction errors (`InvalidPadding`, `UnknownInput`, `ArityMismatch`,
/// `InvalidOperator`) are raised by the call that caused them. `CycleDetected`
/// is raised before inference starts. The remaining kinds are inference errors
/// and are reported together with the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum IrError {
    #[error("Invalid padding {{{before}, {after}}}: padding can not be negative")]
    InvalidPadding { before: i64, after: i64 },
    #[error("Axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },
    #[error("Unknown input node #{input} (graph has {nodes} nodes)")]
    UnknownInput { input: usize, nodes: usize },
    #[error("{op} expects {expected} input(s), got {got}")]
    ArityMismatch { op: String, expected: String, got: usize },
    #[error("Invalid {op}: {reason}")]
    InvalidOperator { op: String, reason: String },
    #[error("Cycle detected through nodes {}", node_list(.nodes))]
    CycleDetected { nodes: Vec<usize> },
    #[error("Input node #{input} has no shape yet")]
    UnresolvedInput { input: usize },
    #[error("Incompatible input shapes: {}", shape_list(.shapes))]
    ShapeMismatch { shapes: Vec<TVec<usize>> },
    #[error(
        "Spatial axis {axis}: padded extent {padded} (input {input}) is smaller than \
         kernel field {kernel_field}, output extent would be {extent}"
    )]
    NegativeOutputExtent {
        axis: usize,
        input: usize,
        padded: usize,
        kernel_field: usize,
        extent: i64,
    },
    #[error("Axis {axis}: output extent does not fit in a usize")]
    ExtentOverflow { axis: usize },
    #[error(
        "Can not reshape {} ({} elements) to {} ({} elements)",
        dims(.from),
        elements(.from),
        dims(.to),
        elements(.to)
    )]
    ElementCountMismatch { from: TVec<usize>, to: TVec<usize> },
    #[error("Expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("{channels} channels can not be split in {groups} groups")]
    ChannelMismatch { channels: usize, groups: usize },
    #[error("Node #{node} has not been shaped yet")]
    NotYetInferred { node: usize },
}

fn node_list(nodes: &[usize]) -> String {
    nodes.iter().map(|n| format!("#{n}")).join(", ")
}

fn shape_list(shapes: &[TVec<usize>]) -> String {
    shapes.iter().map(|s| dims(s)).join(" vs ")
}

fn dims(shape: &[usize]) -> String {
    format!("[{}]", shape.iter().join(","))
}

fn elements(shape: &[usize]) -> String {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .map(|n| n.to_string())
        .unwrap_or_else(|| "too many".to_string())
}

pub type IrResult<T> = Result<T, IrError>;
