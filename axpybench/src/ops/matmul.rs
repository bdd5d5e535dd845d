use anyhow::{anyhow, Result};
use rayon::prelude::*;

use crate::tensor::{Tensor, TensorOptions};

/// `(m, k, n)` for a `[m, k] x [k, n]` product.
pub fn matmul_dims(a_shape: &[usize], b_shape: &[usize]) -> Result<(usize, usize, usize)> {
    if a_shape.len() != 2 || b_shape.len() != 2 {
        return Err(anyhow!(
            "matmul expects 2D inputs, got {:?} and {:?}",
            a_shape,
            b_shape
        ));
    }
    let (m, k) = (a_shape[0], a_shape[1]);
    let (k2, n) = (b_shape[0], b_shape[1]);
    if k != k2 {
        return Err(anyhow!(
            "matmul inner dims must match, got {:?} and {:?}",
            a_shape,
            b_shape
        ));
    }
    Ok((m, k, n))
}

/// Row-parallel `a x b`.
///
/// Each output row is owned by exactly one rayon task, so the result is
/// identical to a sequential product regardless of scheduling.
pub fn matmul_f32(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    let (m, k, n) = matmul_dims(a.shape(), b.shape())?;
    let lhs = a.as_slice();
    let rhs = b.as_slice();
    let mut out = vec![0.0f32; m * n];
    if n > 0 {
        out.par_chunks_mut(n).enumerate().for_each(|(row, out_row)| {
            let lhs_row = &lhs[row * k..(row + 1) * k];
            for (kk, &scale) in lhs_row.iter().enumerate() {
                let rhs_row = &rhs[kk * n..(kk + 1) * n];
                for (acc, &value) in out_row.iter_mut().zip(rhs_row) {
                    *acc += scale * value;
                }
            }
        });
    }
    Tensor::from_vec_with_opts(
        out,
        TensorOptions {
            shape: Some(vec![m, n]),
        },
    )
}
