//! Standard errors, z-statistics and normal p-values.

use hdreg_ols::Regression;
use hdreg_stats::{normal_quantile, two_sided_normal_pvalue};
use hdreg_vcov::Vcov;
use ndarray::{Array1, ArrayView1};

use crate::error::InferenceError;

/// Per-coefficient inference for one regression.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    se: Array1<f64>,
    tstat: Array1<f64>,
    pvalue: Array1<f64>,
}

/// Two-sided confidence bounds at level `1 − alpha`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceInterval {
    alpha: f64,
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl ConfidenceInterval {
    /// Significance level the bounds were built for.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Lower bounds.
    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }
}

impl Inference {
    /// Standard errors, `sqrt(diag(vcov))`.
    pub fn se(&self) -> &Array1<f64> {
        &self.se
    }

    /// `beta_hat / se`.
    pub fn tstat(&self) -> &Array1<f64> {
        &self.tstat
    }

    /// Two-sided p-values under the standard normal.
    pub fn pvalue(&self) -> &Array1<f64> {
        &self.pvalue
    }

    /// Normal-quantile intervals `beta ± z_{1−α/2} · se`.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidAlpha`] unless `0 < alpha < 1`;
    /// [`InferenceError::DimensionMismatch`] if `beta` has the wrong length.
    pub fn conf_int(
        &self,
        beta: ArrayView1<'_, f64>,
        alpha: f64,
    ) -> Result<ConfidenceInterval, InferenceError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(InferenceError::InvalidAlpha { alpha });
        }
        if beta.len() != self.se.len() {
            return Err(InferenceError::DimensionMismatch {
                coef: beta.len(),
                vcov: self.se.len(),
            });
        }
        let z = normal_quantile(1.0 - alpha / 2.0);
        let half = self.se.mapv(|s| z * s);
        Ok(ConfidenceInterval {
            alpha,
            lower: &beta - &half,
            upper: &beta + &half,
        })
    }
}

/// Derives standard errors, z-statistics and p-values from a covariance.
///
/// P-values use the standard normal, not Student's t.
///
/// # Errors
///
/// [`InferenceError::DimensionMismatch`] when `vcov` is not K × K.
pub fn infer(regression: &Regression, vcov: &Vcov) -> Result<Inference, InferenceError> {
    let beta = regression.beta_hat();
    let matrix = vcov.matrix();
    if matrix.nrows() != beta.len() || matrix.ncols() != beta.len() {
        return Err(InferenceError::DimensionMismatch {
            coef: beta.len(),
            vcov: matrix.nrows(),
        });
    }

    let se = matrix.diag().mapv(f64::sqrt);
    let tstat = beta / &se;
    let pvalue = tstat.mapv(two_sided_normal_pvalue);
    Ok(Inference { se, tstat, pvalue })
}
