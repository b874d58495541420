//! Dense linear-algebra helpers shared by the fitting and covariance crates.
//!
//! Matrices travel through the workspace as `ndarray` arrays; decompositions
//! are delegated to `nalgebra`.

use nalgebra::DMatrix;
use nalgebra::linalg::Cholesky;
use ndarray::{Array2, ArrayView2};

use crate::error::OlsError;

/// Relative cutoff below which singular values are treated as zero by
/// [`pinv`].
pub const PINV_RCOND: f64 = 1e-15;

/// Copies an `ndarray` view into a column-major `nalgebra` matrix.
pub fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |i, j| a[[i, j]])
}

/// Copies an `nalgebra` matrix back into an `ndarray` array.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn require_square(a: ArrayView2<'_, f64>) -> Result<usize, OlsError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(OlsError::NotSquare { rows, cols });
    }
    Ok(rows)
}

fn svd_failed() -> OlsError {
    OlsError::Linalg {
        reason: "singular value decomposition did not converge".to_string(),
    }
}

/// Numerical rank of a square matrix.
///
/// Singular values at or below `σ_max · k · ε` count as zero.
///
/// # Errors
///
/// [`OlsError::NotSquare`] for a non-square input, [`OlsError::Linalg`] when
/// the decomposition fails.
pub fn numerical_rank(a: ArrayView2<'_, f64>) -> Result<usize, OlsError> {
    let k = require_square(a)?;
    if k == 0 {
        return Ok(0);
    }
    let svd = to_dmatrix(a)
        .try_svd(false, false, f64::EPSILON, 0)
        .ok_or_else(svd_failed)?;
    let sigma_max = svd.singular_values.max();
    let tol = sigma_max * k as f64 * f64::EPSILON;
    Ok(svd.singular_values.iter().filter(|&&s| s > tol).count())
}

/// Inverts a symmetric positive-definite cross-product matrix such as X'X.
///
/// The matrix is first checked for full numerical rank; Cholesky is tried
/// before falling back to a general LU inverse.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`OlsError::NotSquare`] | `a` is not square |
/// | [`OlsError::RankDeficient`] | numerical rank below the dimension |
/// | [`OlsError::Linalg`] | decomposition failure |
pub fn invert_full_rank(a: ArrayView2<'_, f64>) -> Result<Array2<f64>, OlsError> {
    let k = require_square(a)?;
    let rank = numerical_rank(a)?;
    if rank < k {
        return Err(OlsError::RankDeficient { rank, k });
    }

    let m = to_dmatrix(a);
    let inv = match Cholesky::new(m.clone()) {
        Some(chol) => chol.inverse(),
        None => m.try_inverse().ok_or(OlsError::RankDeficient { rank, k })?,
    };
    Ok(from_dmatrix(&inv))
}

/// Moore-Penrose pseudo-inverse of a square matrix.
///
/// Singular values below `PINV_RCOND · σ_max` are dropped.
///
/// # Errors
///
/// [`OlsError::NotSquare`] for a non-square input, [`OlsError::Linalg`] when
/// the decomposition fails.
pub fn pinv(a: ArrayView2<'_, f64>) -> Result<Array2<f64>, OlsError> {
    let k = require_square(a)?;
    if k == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let svd = to_dmatrix(a)
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(svd_failed)?;
    let cutoff = PINV_RCOND * svd.singular_values.max();
    let inv = svd.pseudo_inverse(cutoff).map_err(|reason| OlsError::Linalg {
        reason: reason.to_string(),
    })?;
    Ok(from_dmatrix(&inv))
}
