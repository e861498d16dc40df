//! # nnir
//!
//! Intermediate representation for tensor computation graphs, and the pass
//! computing the shape of every tensor in a graph.
//!
//! A [`Graph`](model::Graph) is built node by node, each node wrapping an
//! [`Operator`](ops::Operator) and the ids of the nodes feeding it. Once the
//! graph inputs have a shape, [`Graph::infer`](model::Graph::infer) shapes
//! every node, validating padding, strides, kernels and channel counts
//! against the shapes flowing through the graph.
//!
//! ```
//! use nnir_core::prelude::*;
//!
//! let mut model = Graph::default();
//! let input = model.add_source("input", [2, 3, 4]).unwrap();
//! let reshape = model.add_node("reshape", Reshape::new([4, 6].into()), &[input]).unwrap();
//! model.chain("relu", ElementWiseOp::Relu).unwrap();
//! model.infer().unwrap();
//! assert_eq!(model.shape_of(reshape).unwrap(), &Shape::from([4, 6]));
//!
//! model.add_node("bad", Reshape::new([5, 5].into()), &[input]).unwrap();
//! let failure = model.infer().unwrap_err();
//! assert_eq!(failure.node_name.as_deref(), Some("bad"));
//! ```

#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;

pub extern crate nnir_data;

pub mod infer;
pub mod model;
pub mod ops;

/// This prelude is meant for code using nnir.
pub mod prelude {
    pub use crate::infer::{
        Completed, InferenceEngine, InferenceFailure, InferenceOptions, InferenceState,
    };
    pub use crate::model::{Graph, ModelDsl, Node};
    pub use crate::ops::array::{Concat, Reshape, Transpose};
    pub use crate::ops::cnn::{ComputedPaddedDim, Conv, PaddingSpec, Pool, PoolKind, PoolSpec};
    pub use crate::ops::element_wise::ElementWiseOp;
    pub use crate::ops::matmul::MatMul;
    pub use crate::ops::nn::{DataFormat, Reduce, Reducer, Softmax};
    pub use crate::ops::Operator;
    pub use nnir_data::prelude::*;
}

/// This prelude is meant for code extending nnir (like implementing new ops).
pub mod internal {
    pub use crate::model::{Graph, ModelDsl, Node};
    pub use crate::ops::{Arity, Operator};
    pub use nnir_data::internal::*;
}

#[cfg(test)]
fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("NNIR_LOG").try_init();
}
