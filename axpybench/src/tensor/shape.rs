use anyhow::{anyhow, Result};

pub fn numel(shape: &[usize]) -> usize {
    shape.iter().copied().product::<usize>()
}

pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1usize;
    for (idx, dim) in shape.iter().rev().enumerate() {
        let i = shape.len() - 1 - idx;
        strides[i] = stride;
        stride = stride.saturating_mul(*dim);
    }
    strides
}

pub(crate) fn offset_for(shape: &[usize], strides: &[usize], indices: &[usize]) -> Result<usize> {
    if shape.len() != indices.len() {
        return Err(anyhow!(
            "expected {} indices, got {}",
            shape.len(),
            indices.len()
        ));
    }
    let mut offset = 0usize;
    for ((dim, stride), idx) in shape.iter().zip(strides.iter()).zip(indices.iter()) {
        if *idx >= *dim {
            return Err(anyhow!("index {} out of bounds for dim {}", idx, dim));
        }
        offset = offset.saturating_add(idx.saturating_mul(*stride));
    }
    Ok(offset)
}

/// Render a shape the way input signatures spell it: `2048,2048,`.
pub(crate) fn shape_signature(shape: &[usize]) -> String {
    let mut out = String::new();
    for dim in shape {
        out.push_str(&dim.to_string());
        out.push(',');
    }
    out
}
