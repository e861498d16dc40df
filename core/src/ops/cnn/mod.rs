//! Windowed operators: convolution and pooling, and the geometry they share.
mod conv;
mod padding;
mod pooling;
pub mod pools;

pub use self::conv::Conv;
pub use self::padding::{kernel_field, ComputedPaddedDim, PaddingSpec};
pub use self::pooling::{Pool, PoolKind};
pub use self::pools::PoolSpec;
