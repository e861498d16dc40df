mod data_formats;
mod reduce;
mod softmax;

pub use self::data_formats::{DataFormat, DataShape};
pub use self::reduce::{Reduce, Reducer};
pub use self::softmax::Softmax;
