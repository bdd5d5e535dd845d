use anyhow::Result;
use axpybench::{add_f32, exec_op, matmul_f32, normalize_f32, Moments, OpKind, Tensor, TensorOptions};

fn matrix(rows: usize, cols: usize, data: Vec<f32>) -> Result<Tensor> {
    Tensor::from_vec_with_opts(
        data,
        TensorOptions {
            shape: Some(vec![rows, cols]),
        },
    )
}

#[test]
fn tensor_indexing_is_row_major() -> Result<()> {
    let t = matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    assert_eq!(t.strides(), &[3, 1]);
    assert_eq!(t.at(&[1, 0])?, 4.0);
    assert_eq!(t.at(&[0, 2])?, 3.0);
    assert!(t.at(&[2, 0]).is_err());
    assert!(t.at(&[0]).is_err());
    assert!(Tensor::from_vec_with_opts(vec![1.0; 5], TensorOptions { shape: Some(vec![2, 2]) }).is_err());
    assert_eq!(format!("{:?}", Tensor::full(&[6], 1.0)), "Tensor[6] {1.00, 1.00 ... 1.00, 1.00}");
    Ok(())
}

#[test]
fn matmul_small_matrices() -> Result<()> {
    let a = matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    let b = matrix(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0])?;
    let out = matmul_f32(&a, &b)?;
    assert_eq!(out.shape(), &[2, 2]);
    assert_eq!(out.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
    Ok(())
}

#[test]
fn matmul_rejects_inner_mismatch() -> Result<()> {
    let a = Tensor::full(&[2, 3], 1.0);
    let b = Tensor::full(&[2, 2], 1.0);
    assert!(matmul_f32(&a, &b).is_err());
    Ok(())
}

#[test]
fn add_is_elementwise_and_shape_exact() -> Result<()> {
    let a = matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0])?;
    let b = Tensor::square(2, 1.0);
    assert_eq!(add_f32(&a, &b)?.as_slice(), &[2.0, 3.0, 4.0, 5.0]);

    let c = Tensor::full(&[4], 1.0);
    assert!(add_f32(&a, &c).is_err());
    Ok(())
}

#[test]
fn normalize_divides_by_variance() -> Result<()> {
    let t = Tensor::from_vec(vec![1.0, 3.0])?;
    let moments = Moments::of(&t);
    assert_eq!(moments.mean, 2.0);
    assert_eq!(moments.variance, 1.0);

    let t = Tensor::from_vec(vec![0.0, 4.0])?;
    // mean 2, variance 4: (x - 2) / 4
    assert_eq!(normalize_f32(&t)?.as_slice(), &[-0.5, 0.5]);
    Ok(())
}

#[test]
fn normalize_constant_tensor_is_not_finite() -> Result<()> {
    let t = Tensor::square(3, 1.5);
    let out = normalize_f32(&t)?;
    assert!(out.as_slice().iter().all(|v| v.is_nan()));
    assert!(!out.all_finite());
    Ok(())
}

#[test]
fn exec_op_checks_arity() -> Result<()> {
    let t = Tensor::square(2, 1.0);
    assert!(exec_op(OpKind::Add, &[&t]).is_err());
    assert!(exec_op(OpKind::Normalize, &[&t, &t]).is_err());
    let out = exec_op(OpKind::Matmul, &[&t, &t])?;
    assert_eq!(out.as_slice(), &[2.0; 4]);
    Ok(())
}
