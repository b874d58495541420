//! Per-regression result records.

use hdreg_inference::{ConfidenceInterval, Inference, Performance, infer, summarize};
use hdreg_ols::Regression;
use hdreg_vcov::Vcov;
use ndarray::Array1;

use crate::error::HdregError;

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    /// Coefficient name.
    pub coef: String,
    /// Point estimate.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// z-statistic.
    pub t_value: f64,
    /// Two-sided normal p-value.
    pub p_value: f64,
    /// Lower confidence bound.
    pub ci_low: f64,
    /// Upper confidence bound.
    pub ci_high: f64,
}

/// Everything derived for one dependent variable.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionReport {
    index: usize,
    depvar: String,
    coef_names: Vec<String>,
    beta_hat: Array1<f64>,
    fitted: Array1<f64>,
    residual: Array1<f64>,
    vcov: Vcov,
    inference: Inference,
    conf_int: ConfidenceInterval,
    performance: Performance,
}

impl RegressionReport {
    /// Derives inference, intervals at `alpha` and fit statistics.
    ///
    /// # Errors
    ///
    /// [`HdregError::Inference`] if `vcov` does not match the coefficients or
    /// `alpha` is outside (0, 1).
    pub fn new(
        depvar: impl Into<String>,
        coef_names: Vec<String>,
        regression: &Regression,
        vcov: Vcov,
        alpha: f64,
    ) -> Result<Self, HdregError> {
        let inference = infer(regression, &vcov)?;
        let conf_int = inference.conf_int(regression.beta_hat().view(), alpha)?;
        let performance = summarize(regression, regression.n_coef());
        Ok(Self {
            index: regression.index(),
            depvar: depvar.into(),
            coef_names,
            beta_hat: regression.beta_hat().clone(),
            fitted: regression.fitted().clone(),
            residual: regression.residual().clone(),
            vcov,
            inference,
            conf_int,
            performance,
        })
    }

    /// Position of the dependent variable in the formula.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Dependent variable name.
    pub fn depvar(&self) -> &str {
        &self.depvar
    }

    /// Regressor names, aligned with [`beta_hat`](Self::beta_hat).
    pub fn coef_names(&self) -> &[String] {
        &self.coef_names
    }

    /// Estimated coefficients.
    pub fn beta_hat(&self) -> &Array1<f64> {
        &self.beta_hat
    }

    /// Fitted values; within-transformed when fixed effects were absorbed.
    pub fn fitted(&self) -> &Array1<f64> {
        &self.fitted
    }

    /// Residuals.
    pub fn residual(&self) -> &Array1<f64> {
        &self.residual
    }

    /// Coefficient covariance.
    pub fn vcov(&self) -> &Vcov {
        &self.vcov
    }

    /// Standard errors, statistics and p-values.
    pub fn inference(&self) -> &Inference {
        &self.inference
    }

    /// Confidence bounds.
    pub fn conf_int(&self) -> &ConfidenceInterval {
        &self.conf_int
    }

    /// R² and adjusted R².
    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.residual.len()
    }

    /// Estimate for the coefficient called `name`.
    pub fn coef(&self, name: &str) -> Option<f64> {
        self.coef_names
            .iter()
            .position(|n| n == name)
            .map(|j| self.beta_hat[j])
    }

    /// Coefficient table, one row per regressor.
    pub fn tidy(&self) -> Vec<TidyRow> {
        let inf = &self.inference;
        self.coef_names
            .iter()
            .enumerate()
            .map(|(j, name)| TidyRow {
                coef: name.clone(),
                estimate: self.beta_hat[j],
                std_error: inf.se()[j],
                t_value: inf.tstat()[j],
                p_value: inf.pvalue()[j],
                ci_low: self.conf_int.lower()[j],
                ci_high: self.conf_int.upper()[j],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hdreg_ols::fit;
    use hdreg_vcov::{VcovType, vcov};
    use ndarray::array;

    fn report(alpha: f64) -> Result<RegressionReport, HdregError> {
        let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
        let y = array![[4.0], [4.0], [6.0], [10.0]];
        let res = fit(x.view(), y.view(), false).unwrap();
        let reg = &res.regressions()[0];
        let v = vcov(&res, reg, VcovType::Iid, None).unwrap();
        RegressionReport::new(
            "y",
            vec!["Intercept".to_string(), "x".to_string()],
            reg,
            v,
            alpha,
        )
    }

    #[test]
    fn tidy_rows_follow_coefficients() {
        let r = report(0.05).unwrap();
        assert_eq!(r.depvar(), "y");
        assert_eq!(r.index(), 0);
        assert_eq!(r.n_obs(), 4);

        let rows = r.tidy();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].coef, "x");
        assert_relative_eq!(rows[1].estimate, 2.0, max_relative = 1e-10);
        assert_relative_eq!(rows[1].std_error, 0.2_f64.sqrt(), max_relative = 1e-10);
        assert!(rows[1].ci_low < 2.0 && 2.0 < rows[1].ci_high);
        assert!((0.0..=1.0).contains(&rows[0].p_value));
    }

    #[test]
    fn coef_lookup() {
        let r = report(0.1).unwrap();
        assert_relative_eq!(r.coef("Intercept").unwrap(), 1.0, max_relative = 1e-10);
        assert!(r.coef("z").is_none());
        assert_relative_eq!(r.conf_int().alpha(), 0.1);
    }

    #[test]
    fn invalid_alpha() {
        assert!(matches!(report(0.0), Err(HdregError::Inference(_))));
    }
}
