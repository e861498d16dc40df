//! ## Models and graphs
//!
//! A `Graph` is a table of `Node`s. Each node wraps one `Operator` and the
//! ids of the nodes producing its inputs: edges live on the consumer side
//! and are plain indices, so several nodes can share a producer without any
//! ownership between nodes.
//!
//! Graphs are usually built by a model loader, one `add_node` at a time,
//! each node after its inputs. Graph inputs are `Source` nodes carrying the
//! externally supplied input shape.
//!
//! Shapes are then computed in one pass by the
//! [`InferenceEngine`](crate::infer::InferenceEngine), or
//! [`Graph::infer`].
//!
//! ```
//! use nnir_core::prelude::*;
//!
//! let mut model = Graph::default();
//! let input = model.add_source("input", [1, 3, 32, 32]).unwrap();
//! let conv = Conv::new(
//!     PoolSpec::new(
//!         DataFormat::NCHW,
//!         tvec!(3, 3),
//!         PaddingSpec::Explicit(tvec!(Padding::symmetric(1), Padding::symmetric(1))),
//!         None,
//!         Some(tvec!(2, 2)),
//!     ),
//!     16,
//!     1,
//! );
//! let conv = model.add_node("conv", conv, &[input]).unwrap();
//! model.infer().unwrap();
//! assert_eq!(model.shape_of(conv).unwrap(), &Shape::from([1, 16, 16, 16]));
//! ```
pub mod dsl;
mod graph;
mod node;
pub mod order;

pub use self::dsl::ModelDsl;
pub use self::graph::Graph;
pub use self::node::Node;
pub use self::order::eval_order;
