//! Covariance estimators over a fitted regression.

use hdreg_ols::linalg::pinv;
use hdreg_ols::{FitResult, Regression};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cluster::ClusterIds;
use crate::error::VcovError;
use crate::spec::{CrvType, HcType, VcovType};

/// Covariance matrix of one regression's coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Vcov {
    matrix: Array2<f64>,
    correction: f64,
    kind: VcovType,
}

impl Vcov {
    /// K × K covariance matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Small-sample correction factor that was applied.
    pub fn correction(&self) -> f64 {
        self.correction
    }

    /// Estimator that produced this matrix.
    pub fn kind(&self) -> VcovType {
        self.kind
    }

    /// Diagonal of the matrix (coefficient variances).
    pub fn variances(&self) -> Array1<f64> {
        self.matrix.diag().to_owned()
    }
}

/// Computes the covariance of `regression`'s coefficients.
///
/// `regression` must belong to `fit`: the estimators read the shared design
/// and `(X'X)⁻¹` from it. `clusters` is required for cluster estimators and
/// ignored otherwise.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`VcovError::Crv3WithFixedEffects`] | CRV3 on a fit with absorbed fixed effects |
/// | [`VcovError::MissingClusters`] | cluster estimator without `clusters` |
/// | [`VcovError::ClusterLengthMismatch`] | `clusters` length differs from N |
/// | [`VcovError::Ols`] | pseudo-inverse failure in CRV3 |
pub fn vcov(
    fit: &FitResult,
    regression: &Regression,
    kind: VcovType,
    clusters: Option<&ClusterIds>,
) -> Result<Vcov, VcovError> {
    let clusters = check_preconditions(fit, kind, clusters)?;
    estimate(fit, regression, kind, clusters)
}

/// Computes one covariance per regression in `fit`, in regression order.
///
/// Preconditions are checked once before any matrix is computed; any error
/// aborts the whole batch.
///
/// # Errors
///
/// Same as [`vcov`].
#[tracing::instrument(skip_all, fields(kind = %kind, n_regressions = fit.n_depvars()))]
pub fn vcov_all(
    fit: &FitResult,
    kind: VcovType,
    clusters: Option<&ClusterIds>,
) -> Result<Vec<Vcov>, VcovError> {
    let clusters = check_preconditions(fit, kind, clusters)?;
    fit.regressions()
        .iter()
        .map(|reg| estimate(fit, reg, kind, clusters))
        .collect()
}

fn check_preconditions<'a>(
    fit: &FitResult,
    kind: VcovType,
    clusters: Option<&'a ClusterIds>,
) -> Result<Option<&'a ClusterIds>, VcovError> {
    let VcovType::Cluster(crv) = kind else {
        return Ok(None);
    };
    if crv == CrvType::Crv3 && fit.has_fixef() {
        return Err(VcovError::Crv3WithFixedEffects);
    }
    let ids = clusters.ok_or_else(|| VcovError::MissingClusters {
        kind: crv.to_string(),
    })?;
    if ids.len() != fit.n_obs() {
        return Err(VcovError::ClusterLengthMismatch {
            clusters: ids.len(),
            n_obs: fit.n_obs(),
        });
    }
    if ids.n_groups() == 1 {
        warn!(kind = %crv, "only one cluster; cluster-robust covariance is undefined");
    }
    debug!(n_groups = ids.n_groups(), "cluster ids");
    Ok(Some(ids))
}

fn estimate(
    fit: &FitResult,
    regression: &Regression,
    kind: VcovType,
    clusters: Option<&ClusterIds>,
) -> Result<Vcov, VcovError> {
    let n = regression.n_obs() as f64;
    let k = regression.n_coef() as f64;
    let x = fit.x().view();
    let bread = fit.xtx_inv().view();
    let u = regression.residual().view();

    let (matrix, correction) = match (kind, clusters) {
        (VcovType::Iid, _) => {
            let sigma2 = u.dot(&u) / n;
            (bread.mapv(|b| b * sigma2), 1.0)
        }
        (VcovType::Hetero(hc), _) => {
            let weights = hc_weights(x, bread, u, hc);
            let cc = match hc {
                HcType::Hc1 => n / (n - k),
                HcType::Hc2 | HcType::Hc3 => 1.0,
            };
            let meat = weighted_cross_product(x, weights.view());
            (sandwich(bread, meat.view(), cc), cc)
        }
        (VcovType::Cluster(CrvType::Crv1), Some(ids)) => {
            let g = ids.n_groups() as f64;
            let cc = g / (g - 1.0) * (n - 1.0) / (n - k);
            let meat = cluster_meat(x, u, ids);
            (sandwich(bread, meat.view(), cc), cc)
        }
        (VcovType::Cluster(CrvType::Crv3), Some(ids)) => {
            let g = ids.n_groups() as f64;
            let cc = (g - 1.0) / g;
            let acc = jackknife(x, regression, ids)?;
            (acc.mapv(|v| v * cc), cc)
        }
        (VcovType::Cluster(crv), None) => {
            return Err(VcovError::MissingClusters {
                kind: crv.to_string(),
            });
        }
    };
    debug!(kind = %kind, correction, "covariance");

    Ok(Vcov {
        matrix,
        correction,
        kind,
    })
}

/// `h_i = x_i' (X'X)⁻¹ x_i`.
fn leverage(x: ArrayView2<'_, f64>, bread: ArrayView2<'_, f64>) -> Array1<f64> {
    (&x.dot(&bread) * &x).sum_axis(Axis(1))
}

fn hc_weights(
    x: ArrayView2<'_, f64>,
    bread: ArrayView2<'_, f64>,
    u: ArrayView1<'_, f64>,
    hc: HcType,
) -> Array1<f64> {
    let u2 = u.mapv(|v| v * v);
    if hc == HcType::Hc1 {
        return u2;
    }
    let h = leverage(x, bread);
    if let Some(row) = h.iter().position(|&hi| hi >= 1.0) {
        warn!(row, kind = %hc, "leverage of 1; covariance will not be finite");
    }
    let power = if hc == HcType::Hc2 { 1 } else { 2 };
    let mut w = u2;
    w.zip_mut_with(&h, |wi, &hi| *wi /= (1.0 - hi).powi(power));
    w
}

/// `X' diag(w) X`.
fn weighted_cross_product(x: ArrayView2<'_, f64>, w: ArrayView1<'_, f64>) -> Array2<f64> {
    let xw = &x * &w.insert_axis(Axis(1));
    x.t().dot(&xw)
}

/// `Σ_g (X_g' u_g)(X_g' u_g)'`.
fn cluster_meat(x: ArrayView2<'_, f64>, u: ArrayView1<'_, f64>, ids: &ClusterIds) -> Array2<f64> {
    let mut scores = Array2::<f64>::zeros((ids.n_groups(), x.ncols()));
    for ((row, &g), &ui) in x.outer_iter().zip(ids.codes()).zip(u.iter()) {
        scores.row_mut(g).scaled_add(ui, &row);
    }
    scores.t().dot(&scores)
}

fn sandwich(bread: ArrayView2<'_, f64>, meat: ArrayView2<'_, f64>, cc: f64) -> Array2<f64> {
    bread.dot(&meat).dot(&bread).mapv(|v| v * cc)
}

/// Unscaled leave-one-cluster-out sum `Σ_g (β_g − β̂)(β_g − β̂)'`.
///
/// The per-cluster refits run in parallel; the sum is accumulated in
/// cluster order so results do not depend on scheduling.
fn jackknife(
    x: ArrayView2<'_, f64>,
    regression: &Regression,
    ids: &ClusterIds,
) -> Result<Array2<f64>, VcovError> {
    let y = regression.y().view();
    let beta_hat = regression.beta_hat();
    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y);

    let betas = ids
        .members()
        .par_iter()
        .map(|rows| -> Result<Array1<f64>, VcovError> {
            let x_g = x.select(Axis(0), rows);
            let y_g = y.select(Axis(0), rows);
            let xtx_g = &xtx - &x_g.t().dot(&x_g);
            let xty_g = &xty - &x_g.t().dot(&y_g);
            Ok(pinv(xtx_g.view())?.dot(&xty_g))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let k = x.ncols();
    let mut acc = Array2::<f64>::zeros((k, k));
    for beta_g in betas {
        let diff = &beta_g - beta_hat;
        let col = diff.view().insert_axis(Axis(1));
        acc += &col.dot(&col.t());
    }
    Ok(acc)
}
