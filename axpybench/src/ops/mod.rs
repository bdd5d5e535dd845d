mod add;
mod matmul;
mod normalize;

pub use add::add_f32;
pub use matmul::{matmul_dims, matmul_f32};
pub use normalize::{normalize_f32, Moments};
