use anyhow::{anyhow, Result};

use crate::graph::OpKind;
use crate::ops::{add_f32, matmul_f32, normalize_f32};
use crate::tensor::Tensor;

/// Run one op on the CPU kernels.
pub fn exec_op(op: OpKind, inputs: &[&Tensor]) -> Result<Tensor> {
    if inputs.len() != op.arity() {
        return Err(anyhow!(
            "op {} expects {} inputs, got {}",
            op,
            op.arity(),
            inputs.len()
        ));
    }
    match op {
        OpKind::Normalize => normalize_f32(inputs[0]),
        OpKind::Matmul => matmul_f32(inputs[0], inputs[1]),
        OpKind::Add => add_f32(inputs[0], inputs[1]),
    }
}
