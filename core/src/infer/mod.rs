//! # Shape inference
//!
//! The `InferenceEngine` walks a `Graph` in topological order and computes
//! the output shape of every node from the shapes of its inputs, checking
//! operator parameters (padding, strides, kernels, channel counts...) against
//! the shapes flowing through the graph.
//!
//! A run is all or nothing: shapes are computed in a scratch table and only
//! published to the nodes once every node is shaped. The first failing node
//! stops the run and is reported in the `InferenceFailure`.
use thiserror::Error;

use crate::internal::*;

/// Knobs for an inference run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InferenceOptions {
    /// Re-check the computed shape table before publishing it. On by default
    /// with the `paranoid_assertions` feature.
    pub check_consistency: bool,
    /// Reject graphs producing tensors of a higher rank.
    pub max_rank: Option<usize>,
}

impl Default for InferenceOptions {
    fn default() -> InferenceOptions {
        InferenceOptions {
            check_consistency: cfg!(feature = "paranoid_assertions"),
            max_rank: None,
        }
    }
}

impl InferenceOptions {
    pub fn with_check_consistency(self, check_consistency: bool) -> InferenceOptions {
        InferenceOptions { check_consistency, ..self }
    }

    pub fn with_max_rank(self, max_rank: usize) -> InferenceOptions {
        InferenceOptions { max_rank: Some(max_rank), ..self }
    }
}

/// Where the last inference run left a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InferenceState {
    /// No run since the graph was built or last modified.
    #[default]
    NotStarted,
    Running,
    /// Every node has its shape.
    Completed,
    /// No node has a shape.
    Failed(InferenceFailure),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    /// Node ids in the order they were shaped.
    pub order: Vec<usize>,
}

impl Completed {
    /// Number of nodes shaped.
    pub fn shaped(&self) -> usize {
        self.order.len()
    }
}

/// Outcome of a failed run: the first error met, and the node it was met at.
///
/// Errors about the graph as a whole (cycles) are not attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Inference failed{}: {error}", location(.node, .node_name))]
pub struct InferenceFailure {
    pub node: Option<usize>,
    pub node_name: Option<String>,
    #[source]
    pub error: IrError,
}

fn location(node: &Option<usize>, node_name: &Option<String>) -> String {
    match (node, node_name) {
        (Some(id), Some(name)) => format!(" at node #{id} \"{name}\""),
        (Some(id), None) => format!(" at node #{id}"),
        _ => String::new(),
    }
}

impl InferenceFailure {
    fn structural(error: IrError) -> InferenceFailure {
        InferenceFailure { node: None, node_name: None, error }
    }

    fn at(node: &Node, error: IrError) -> InferenceFailure {
        InferenceFailure { node: Some(node.id), node_name: Some(node.name.clone()), error }
    }
}

/// Computes the output shape of every node of a graph.
///
/// An engine holds no state between runs: the same engine can shape any
/// number of graphs, and running it again on an unchanged graph reproduces
/// the same shapes.
#[derive(Debug, Clone, Default, new)]
pub struct InferenceEngine {
    pub options: InferenceOptions,
}

impl InferenceEngine {
    pub fn run(&self, model: &mut Graph) -> Result<Completed, InferenceFailure> {
        debug!("Inference starting on {} nodes", model.len());
        model.clear_shapes();
        model.set_state(InferenceState::Running);
        match self.compute(model) {
            Ok((order, shapes)) => {
                model.publish_shapes(shapes);
                model.set_state(InferenceState::Completed);
                debug!("Inference completed, {} nodes shaped", order.len());
                Ok(Completed { order })
            }
            Err(failure) => {
                debug!("{failure}");
                model.clear_shapes();
                model.set_state(InferenceState::Failed(failure.clone()));
                Err(failure)
            }
        }
    }

    /// Shapes every node without touching the graph. Returns the order used
    /// and the shape table, indexed by node id.
    fn compute(&self, model: &Graph) -> Result<(Vec<usize>, Vec<Shape>), InferenceFailure> {
        let order = model.eval_order().map_err(InferenceFailure::structural)?;
        let mut shapes: Vec<Option<Shape>> = vec![None; model.len()];
        for &id in &order {
            let node = &model.nodes()[id];
            let shape =
                self.infer_node(node, &shapes).map_err(|e| InferenceFailure::at(node, e))?;
            trace!("{node} => {shape}");
            shapes[id] = Some(shape);
        }
        let shapes = shapes
            .into_iter()
            .enumerate()
            .map(|(id, shape)| shape.ok_or(IrError::UnresolvedInput { input: id }))
            .collect::<IrResult<Vec<Shape>>>()
            .map_err(InferenceFailure::structural)?;
        if self.options.check_consistency {
            Self::check_consistency(model, &order, &shapes)?;
        }
        Ok((order, shapes))
    }

    fn infer_node(&self, node: &Node, shapes: &[Option<Shape>]) -> IrResult<Shape> {
        let inputs = node
            .inputs
            .iter()
            .map(|&input| shapes[input].as_ref().ok_or(IrError::UnresolvedInput { input }))
            .collect::<IrResult<TVec<&Shape>>>()?;
        let shape = node.op.output_shape(&inputs)?;
        if let Some(max_rank) = self.options.max_rank {
            if shape.rank() > max_rank {
                return Err(IrError::RankMismatch { expected: max_rank, got: shape.rank() });
            }
        }
        Ok(shape)
    }

    /// Every node comes after its inputs in `order`, and its recorded shape
    /// is what its operator computes from its inputs' recorded shapes.
    fn check_consistency(
        model: &Graph,
        order: &[usize],
        shapes: &[Shape],
    ) -> Result<(), InferenceFailure> {
        let mut position = vec![usize::MAX; model.len()];
        for (ix, &id) in order.iter().enumerate() {
            position[id] = ix;
        }
        for node in model.nodes() {
            let late = node.inputs.iter().find(|&&i| position[i] >= position[node.id]);
            if let Some(&input) = late {
                return Err(InferenceFailure::at(node, IrError::UnresolvedInput { input }));
            }
            let inputs = node.inputs.iter().map(|&i| &shapes[i]).collect::<TVec<&Shape>>();
            let recomputed =
                node.op.output_shape(&inputs).map_err(|e| InferenceFailure::at(node, e))?;
            if recomputed != shapes[node.id] {
                let shapes = vec![shapes[node.id].to_tvec(), recomputed.to_tvec()];
                return Err(InferenceFailure::at(node, IrError::ShapeMismatch { shapes }));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::array::Reshape;
    use crate::ops::cnn::{Conv, PaddingSpec, Pool, PoolKind, PoolSpec};
    use crate::ops::element_wise::ElementWiseOp;
    use crate::ops::nn::DataFormat;

    fn conv_1d(kernel: usize, stride: usize, padding: PaddingSpec) -> Conv {
        Conv::new(
            PoolSpec::new(DataFormat::CHW, tvec!(kernel), padding, None, Some(tvec!(stride))),
            4,
            1,
        )
    }

    #[test]
    fn conv_padding_and_stride() -> anyhow::Result<()> {
        crate::setup_test_logger();
        let mut model = Graph::default();
        let input = model.add_source("input", [2, 5])?;
        let padding = PaddingSpec::explicit([Padding::new(1, 1)?]);
        let conv = model.add_node("conv", conv_1d(3, 2, padding), &[input])?;
        let done = model.infer()?;
        assert_eq!(done.shaped(), 2);
        assert_eq!(model.shape_of(conv)?, &Shape::from([4, 3]));
        assert_eq!(model.state(), &InferenceState::Completed);
        Ok(())
    }

    #[test]
    fn kernel_larger_than_padded_input() -> anyhow::Result<()> {
        crate::setup_test_logger();
        let mut model = Graph::default();
        let input = model.add_source("input", [2, 5])?;
        let conv = model.add_node("conv", conv_1d(7, 1, PaddingSpec::Valid), &[input])?;
        model.chain("relu", ElementWiseOp::Relu)?;
        let failure = model.infer().unwrap_err();
        assert_eq!(failure.node, Some(conv));
        assert_eq!(failure.node_name.as_deref(), Some("conv"));
        assert!(matches!(failure.error, IrError::NegativeOutputExtent { extent: -1, .. }));
        assert_eq!(model.state(), &InferenceState::Failed(failure));
        assert!(model.nodes().iter().all(|n| !n.is_shaped()));
        assert_eq!(model.shape_of(input), Err(IrError::NotYetInferred { node: input }));
        Ok(())
    }

    #[test]
    fn reshape() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let input = model.add_source("input", [2, 3, 4])?;
        let ok = model.add_node("ok", Reshape::new([4, 6].into()), &[input])?;
        model.infer()?;
        assert_eq!(model.shape_of(ok)?, &Shape::from([4, 6]));
        let ko = model.add_node("ko", Reshape::new([5, 5].into()), &[input])?;
        let failure = model.infer().unwrap_err();
        assert_eq!(failure.node, Some(ko));
        assert_eq!(
            failure.error,
            IrError::ElementCountMismatch { from: tvec!(2, 3, 4), to: tvec!(5, 5) }
        );
        Ok(())
    }

    #[test]
    fn first_failure_in_order_wins() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let a = model.add_source("a", [2, 3])?;
        let b = model.add_source("b", [3, 2])?;
        let add = model.add_node("add", ElementWiseOp::Add, &[a, b])?;
        model.add_node("reshape", Reshape::new([7].into()), &[add])?;
        let failure = model.infer().unwrap_err();
        assert_eq!(failure.node, Some(add));
        assert!(matches!(failure.error, IrError::ShapeMismatch { .. }));
        Ok(())
    }

    #[test]
    fn cycle() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let a = model.add_source("a", [4])?;
        let b = model.add_node("b", ElementWiseOp::Add, &[a, a])?;
        let c = model.add_node("c", ElementWiseOp::Relu, &[b])?;
        model.set_input(b, 1, c)?;
        assert!(matches!(model.topological_order(), Err(IrError::CycleDetected { .. })));
        let failure = model.infer().unwrap_err();
        assert_eq!(failure.node, None);
        assert!(matches!(failure.error, IrError::CycleDetected { .. }));
        assert!(model.nodes().iter().all(|n| !n.is_shaped()));
        Ok(())
    }

    #[test]
    fn rerun_is_idempotent() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let input = model.add_source("input", [1, 3, 16, 16])?;
        let strides = Some(tvec!(2, 2));
        let spec = PoolSpec::new(DataFormat::NCHW, tvec!(2, 2), PaddingSpec::Valid, None, strides);
        let pool = Pool::new(spec, PoolKind::Max);
        model.add_node("pool", pool, &[input])?;
        model.chain("sigmoid", ElementWiseOp::Sigmoid)?;
        let first = model.infer()?;
        let shapes = model.nodes().iter().map(|n| n.shape().cloned()).collect::<Vec<_>>();
        let second = model.infer()?;
        assert_eq!(first, second);
        assert_eq!(shapes, model.nodes().iter().map(|n| n.shape().cloned()).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn recovers_after_fix() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let input = model.add_source("input", [2, 5])?;
        let conv = model.add_node("conv", conv_1d(7, 1, PaddingSpec::Valid), &[input])?;
        assert!(model.infer().is_err());
        model.set_source_shape(input, [2, 9])?;
        assert_eq!(model.state(), &InferenceState::NotStarted);
        model.infer()?;
        assert_eq!(model.shape_of(conv)?, &Shape::from([4, 3]));
        Ok(())
    }

    #[test]
    fn max_rank() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let input = model.add_source("input", [1, 2, 3, 4, 5])?;
        let relu = model.chain("relu", ElementWiseOp::Relu)?;
        let engine = InferenceEngine::new(InferenceOptions::default().with_max_rank(4));
        let failure = engine.run(&mut model).unwrap_err();
        assert_eq!(failure.node, Some(input));
        assert_eq!(failure.error, IrError::RankMismatch { expected: 4, got: 5 });
        let engine = InferenceEngine::new(InferenceOptions::default().with_max_rank(5));
        engine.run(&mut model)?;
        assert!(model.shape_of(relu).is_ok());
        Ok(())
    }

    #[test]
    fn consistency_check() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let a = model.add_source("a", [3, 8])?;
        let b = model.add_const("b", [8, 2])?;
        model.add_node("mm", crate::ops::matmul::MatMul::default(), &[a, b])?;
        let engine = InferenceEngine::new(InferenceOptions::default().with_check_consistency(true));
        let done = engine.run(&mut model)?;
        assert_eq!(done.order, vec![0, 1, 2]);
        assert_eq!(model.shape_of(2)?, &Shape::from([3, 2]));
        Ok(())
    }

    #[test]
    fn failure_display() {
        let failure = InferenceFailure {
            node: Some(3),
            node_name: Some("conv".into()),
            error: IrError::NotYetInferred { node: 1 },
        };
        assert!(failure.to_string().starts_with("Inference failed at node #3 \"conv\": "));
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn input_without_shape() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let input = model.add_source("input", [4])?;
        let relu = model.chain("relu", ElementWiseOp::Relu)?;
        let engine = InferenceEngine::default();
        let node = &model.nodes()[relu];
        assert_eq!(engine.infer_node(node, &[None, None]), Err(IrError::UnresolvedInput { input }));
        assert_eq!(engine.infer_node(node, &[Some(Shape::from([4])), None]), Ok(Shape::from([4])));
        Ok(())
    }

    #[test]
    fn consistency_check_rejects_bad_table() -> anyhow::Result<()> {
        let mut model = Graph::default();
        let a = model.add_source("a", [3, 8])?;
        let relu = model.chain("relu", ElementWiseOp::Relu)?;
        let good = [Shape::from([3, 8]), Shape::from([3, 8])];
        assert!(InferenceEngine::check_consistency(&model, &[a, relu], &good).is_ok());

        let tampered = [Shape::from([3, 8]), Shape::from([8, 3])];
        let failure =
            InferenceEngine::check_consistency(&model, &[a, relu], &tampered).unwrap_err();
        assert_eq!(failure.node, Some(relu));
        let shapes = vec![tvec!(8, 3), tvec!(3, 8)];
        assert_eq!(failure.error, IrError::ShapeMismatch { shapes });

        let failure = InferenceEngine::check_consistency(&model, &[relu, a], &good).unwrap_err();
        assert_eq!(failure.node, Some(relu));
        assert_eq!(failure.error, IrError::UnresolvedInput { input: a });
        Ok(())
    }

    #[test]
    fn shareable_across_threads() {
        fn is_send_sync<T: Send + Sync>() {}
        is_send_sync::<Graph>();
        is_send_sync::<InferenceEngine>();
        is_send_sync::<IrError>();
        is_send_sync::<InferenceFailure>();
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ops::cnn::{kernel_field, Conv, PaddingSpec, PoolSpec};
    use crate::ops::element_wise::ElementWiseOp;
    use crate::ops::nn::DataFormat;
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Graphs of unary and binary element wise nodes over a single source,
    /// each node reading from nodes built before it.
    fn dag() -> impl Strategy<Value = Graph> {
        vec((any::<bool>(), any::<usize>(), any::<usize>()), 0..20).prop_map(|specs| {
            let mut model = Graph::default();
            model.add_source("input", [2, 3]).unwrap();
            for (ix, (binary, a, b)) in specs.into_iter().enumerate() {
                let nodes = ix + 1;
                let name = format!("n{}", nodes);
                if binary {
                    model.add_node(name, ElementWiseOp::Add, &[a % nodes, b % nodes]).unwrap();
                } else {
                    model.add_node(name, ElementWiseOp::Relu, &[a % nodes]).unwrap();
                }
            }
            model
        })
    }

    proptest! {
        #[test]
        fn dag_infers_every_node(mut model in dag()) {
            let done = model.infer().unwrap();
            prop_assert_eq!(done.shaped(), model.len());
            for node in model.nodes() {
                prop_assert_eq!(node.shape().unwrap(), &Shape::from([2, 3]));
            }
            let again = model.infer().unwrap();
            prop_assert_eq!(done, again);
        }

        #[test]
        fn order_puts_inputs_first(model in dag()) {
            let order = model.topological_order().unwrap().collect::<Vec<_>>();
            prop_assert_eq!(order.len(), model.len());
            for node in model.nodes() {
                let pos = order.iter().position(|&n| n == node.id).unwrap();
                for input in node.inputs() {
                    prop_assert!(order.iter().position(|n| n == input).unwrap() < pos);
                }
            }
        }

        #[test]
        fn cycles_never_yield_partial_order(
            len in 1usize..10,
            from in 0usize..10,
            to in 0usize..10,
        ) {
            let mut model = Graph::default();
            model.add_source("input", [4]).unwrap();
            for ix in 0..len {
                model.chain(format!("relu.{ix}"), ElementWiseOp::Relu).unwrap();
            }
            let from = 1 + from % len;
            let to = from + to % (len + 1 - from);
            model.set_input(from, 0, to).unwrap();
            let is_cycle = matches!(model.topological_order(), Err(IrError::CycleDetected { .. }));
            prop_assert!(is_cycle);
            let failure = model.infer().unwrap_err();
            prop_assert_eq!(failure.node, None);
            prop_assert!(model.nodes().iter().all(|n| !n.is_shaped()));
        }

        #[test]
        fn conv_extent_formula(
            input in 1usize..40,
            kernel in 1usize..6,
            dilation in 1usize..4,
            stride in 1usize..4,
            before in 0usize..4,
            after in 0usize..4,
        ) {
            let conv = Conv::new(
                PoolSpec::new(
                    DataFormat::NCHW,
                    tvec!(kernel),
                    PaddingSpec::explicit([Padding::from((before, after))]),
                    Some(tvec!(dilation)),
                    Some(tvec!(stride)),
                ),
                2,
                1,
            );
            let mut model = Graph::default();
            let source = model.add_source("input", [1, 1, input]).unwrap();
            let node = model.add_node("conv", conv, &[source]).unwrap();
            let field = kernel_field(kernel, dilation).unwrap() as i64;
            let numerator = (input + before + after) as i64 - field;
            let expected = numerator.div_euclid(stride as i64) + 1;
            match model.infer() {
                Ok(_) => {
                    let expected = Shape::from([1, 2, expected as usize]);
                    prop_assert_eq!(model.shape_of(node).unwrap(), &expected);
                }
                Err(failure) => {
                    prop_assert!(expected <= 0);
                    prop_assert_eq!(failure.node, Some(node));
                    let negative = matches!(failure.error, IrError::NegativeOutputExtent { .. });
                    prop_assert!(negative);
                }
            }
        }
    }
}
