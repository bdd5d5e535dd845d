use anyhow::{anyhow, Result};

use crate::tensor::{Tensor, TensorOptions};

/// Elementwise `a + b`. Shapes must match exactly; there is no broadcasting.
pub fn add_f32(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    if a.shape() != b.shape() {
        return Err(anyhow!(
            "add op shape mismatch: {:?} vs {:?}",
            a.shape(),
            b.shape()
        ));
    }
    let out = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(lhs, rhs)| lhs + rhs)
        .collect::<Vec<_>>();
    Tensor::from_vec_with_opts(
        out,
        TensorOptions {
            shape: Some(a.shape().to_vec()),
        },
    )
}
