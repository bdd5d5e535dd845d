//! Dense `f32` tensor container.
//!
//! `Tensor` owns flat row-major storage with shape/stride metadata. Every
//! tensor in the benchmark is a square matrix, but the container itself only
//! assumes a contiguous layout.
use std::fmt;

use anyhow::{anyhow, Result};

use super::shape::{compute_strides, numel, offset_for};
use crate::formatting::format_truncated;

/// Tensor construction options (shape override).
#[derive(Debug, Clone, Default)]
pub struct TensorOptions {
    /// Optional explicit shape. Defaults to a 1-D shape of the data length.
    pub shape: Option<Vec<usize>>,
}

/// Owned tensor of 32-bit floats.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Tensor {
    /// Build a tensor from a flat data vector.
    ///
    /// # Example
    /// ```no_run
    /// # use axpybench::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0])?;
    /// # Ok(()) }
    /// ```
    pub fn from_vec(data: Vec<f32>) -> Result<Self> {
        Self::from_vec_with_opts(data, TensorOptions::default())
    }

    /// Build a tensor with explicit options.
    ///
    /// # Example
    /// ```no_run
    /// # use axpybench::{Tensor, TensorOptions};
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::from_vec_with_opts(
    ///     vec![1.0f32, 2.0, 3.0, 4.0],
    ///     TensorOptions { shape: Some(vec![2, 2]) },
    /// )?;
    /// # Ok(()) }
    /// ```
    pub fn from_vec_with_opts(data: Vec<f32>, opts: TensorOptions) -> Result<Self> {
        let shape = match opts.shape {
            Some(shape) => shape,
            None => vec![data.len()],
        };
        let expected = numel(&shape);
        if expected != data.len() {
            return Err(anyhow!(
                "tensor shape {:?} expects {} values, got {}",
                shape,
                expected,
                data.len()
            ));
        }
        let strides = compute_strides(&shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Tensor of `shape` with every entry set to `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        Self {
            data: vec![value; numel(shape)],
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    /// Square `dim x dim` matrix filled with `value`.
    pub fn square(dim: usize, value: f32) -> Self {
        Self::full(&[dim, dim], value)
    }

    /// Return the tensor shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the tensor strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Contiguous row-major view of the values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Access a value by multidimensional indices.
    pub fn at(&self, indices: &[usize]) -> Result<f32> {
        let offset = offset_for(&self.shape, &self.strides, indices)?;
        Ok(self.data[offset])
    }

    /// True when every entry is finite (no NaN or infinity).
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    /// Size of the backing storage in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor{:?} {}", self.shape, format_truncated(&self.data))
    }
}
