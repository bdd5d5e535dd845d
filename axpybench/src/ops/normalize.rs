use anyhow::Result;

use crate::tensor::{Tensor, TensorOptions};

/// Batch statistics over every element of a tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f32,
    /// Population variance (mean of squared deviations).
    pub variance: f32,
}

impl Moments {
    pub fn of(tensor: &Tensor) -> Self {
        let data = tensor.as_slice();
        if data.is_empty() {
            return Self {
                mean: f32::NAN,
                variance: f32::NAN,
            };
        }
        let count = data.len() as f64;
        let mean = data.iter().map(|&v| v as f64).sum::<f64>() / count;
        let mean = mean as f32;
        let variance = data
            .iter()
            .map(|&v| {
                let dev = (v - mean) as f64;
                dev * dev
            })
            .sum::<f64>()
            / count;
        Self {
            mean,
            variance: variance as f32,
        }
    }
}

/// `(x - mean) / variance` using whole-tensor moments.
///
/// The divisor is the variance itself, not its square root. A zero variance
/// is not special-cased: the division yields NaN (or infinity) and that value
/// propagates to the caller.
pub fn normalize_f32(input: &Tensor) -> Result<Tensor> {
    let moments = Moments::of(input);
    if moments.variance == 0.0 || !moments.variance.is_finite() {
        crate::warning!(
            "normalize: variance is {} (mean {}); output will be non-finite",
            moments.variance,
            moments.mean
        );
    }
    let out = input
        .as_slice()
        .iter()
        .map(|&v| (v - moments.mean) / moments.variance)
        .collect::<Vec<_>>();
    Tensor::from_vec_with_opts(
        out,
        TensorOptions {
            shape: Some(input.shape().to_vec()),
        },
    )
}
