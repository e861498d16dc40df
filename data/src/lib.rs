//! Value types shared by every layer of the IR: tensor shapes, per-axis
//! padding, and the error taxonomy.

#[macro_use]
mod macros;

/// A Smallvec instantiation with 4 embeddable values.
///
/// Used about everywhere, for node inputs, shapes and per-axis parameters.
pub type TVec<T> = smallvec::SmallVec<[T; 4]>;

pub mod prelude {
    pub use crate::errors::{IrError, IrResult};
    pub use crate::padding::Padding;
    pub use crate::shape::Shape;
    pub use crate::tvec;
    pub use crate::TVec;
}

pub mod internal {
    pub use crate::prelude::*;
    pub use itertools::Itertools;
    pub use smallvec as nnir_smallvec;
}

mod errors;
mod padding;
mod shape;

pub use errors::{IrError, IrResult};
