mod shape;
mod tensor;

pub(crate) use shape::shape_signature;
pub use tensor::{Tensor, TensorOptions};
