/// # Operators on array and shapes
mod concat;
mod permute_axes;
mod reshape;

pub use self::concat::Concat;
pub use self::permute_axes::Transpose;
pub use self::reshape::Reshape;
