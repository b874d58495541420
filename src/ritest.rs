//! Randomization inference for a single regressor.
//!
//! The regressor named by [`RitestOptions::resampvar`] is redrawn with
//! replacement from its observed support (once per row, or once per
//! cluster), the model is refitted, and the chosen statistic is recorded.
//! The p-value is the share of redrawn statistics at least as extreme as the
//! one on the observed data.

use hdreg_demean::FixedEffectSolver;
use hdreg_formula::{ColumnTable, FormulaError};
use hdreg_inference::{InferenceError, infer};
use hdreg_stats::normal_quantile;
use hdreg_vcov::VcovSpec;
use rand::Rng;
use tracing::{debug, info};

use crate::error::HdregError;
use crate::estimate::{DEFAULT_ALPHA, Estimation};

/// Statistic recorded for each redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RiStatistic {
    /// The coefficient itself.
    #[default]
    Coef,
    /// The t-statistic under the configured covariance.
    Tstat,
}

/// Which tail counts as extreme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alternative {
    /// `|stat_r| ≥ |stat|`.
    #[default]
    TwoSided,
    /// `stat_r ≥ stat`.
    Right,
    /// `stat_r ≤ stat`.
    Left,
}

/// Configuration of a randomization test.
///
/// # Example
///
/// ```
/// use hdreg::{RiStatistic, RitestOptions};
///
/// let options = RitestOptions::new("treat", 500)
///     .with_statistic(RiStatistic::Tstat)
///     .with_cluster("school");
/// assert_eq!(options.reps(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct RitestOptions {
    resampvar: String,
    reps: usize,
    statistic: RiStatistic,
    alternative: Alternative,
    cluster: Option<String>,
    vcov: VcovSpec,
    alpha: f64,
}

impl RitestOptions {
    /// Creates options for redrawing `resampvar` `reps` times.
    ///
    /// Defaults: coefficient statistic, two-sided, row-level redraws, iid
    /// covariance, `alpha = 0.05`.
    pub fn new(resampvar: impl Into<String>, reps: usize) -> Self {
        Self {
            resampvar: resampvar.into(),
            reps,
            statistic: RiStatistic::default(),
            alternative: Alternative::default(),
            cluster: None,
            vcov: VcovSpec::Iid,
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Sets the recorded statistic.
    pub fn with_statistic(mut self, statistic: RiStatistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Sets the alternative hypothesis.
    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Redraws one value per cluster of `column` instead of one per row.
    pub fn with_cluster(mut self, column: impl Into<String>) -> Self {
        self.cluster = Some(column.into());
        self
    }

    /// Sets the covariance used for [`RiStatistic::Tstat`].
    pub fn with_vcov(mut self, vcov: VcovSpec) -> Self {
        self.vcov = vcov;
        self
    }

    /// Sets the level of the interval around the p-value.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Name of the redrawn regressor.
    pub fn resampvar(&self) -> &str {
        &self.resampvar
    }

    /// Number of redraws.
    pub fn reps(&self) -> usize {
        self.reps
    }

    /// Recorded statistic.
    pub fn statistic(&self) -> RiStatistic {
        self.statistic
    }

    /// Alternative hypothesis.
    pub fn alternative(&self) -> Alternative {
        self.alternative
    }

    /// Cluster column, if redraws are per cluster.
    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    /// Covariance used for t-statistics.
    pub fn vcov(&self) -> &VcovSpec {
        &self.vcov
    }

    /// Level of the p-value interval.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn validate(&self) -> Result<(), HdregError> {
        if self.reps == 0 {
            return Err(HdregError::InvalidRitest {
                reason: "reps must be at least 1".to_string(),
            });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(InferenceError::InvalidAlpha { alpha: self.alpha }.into());
        }
        Ok(())
    }
}

/// Outcome of a randomization test for one dependent variable.
#[derive(Debug, Clone, PartialEq)]
pub struct RitestResult {
    depvar: String,
    statistic: f64,
    pvalue: f64,
    pvalue_se: f64,
    ci_low: f64,
    ci_high: f64,
    draws: Vec<f64>,
}

impl RitestResult {
    /// Dependent variable.
    pub fn depvar(&self) -> &str {
        &self.depvar
    }

    /// Statistic on the observed data.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Randomization p-value.
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// Monte Carlo standard error of the p-value, `√(p(1−p)/reps)`.
    pub fn pvalue_se(&self) -> f64 {
        self.pvalue_se
    }

    /// Lower bound of the normal interval around the p-value, floored at 0.
    pub fn ci_low(&self) -> f64 {
        self.ci_low
    }

    /// Upper bound of the normal interval around the p-value, capped at 1.
    pub fn ci_high(&self) -> f64 {
        self.ci_high
    }

    /// Statistic under each redraw, in draw order.
    pub fn draws(&self) -> &[f64] {
        &self.draws
    }
}

impl Estimation {
    /// Runs a randomization test on one regressor, for every dependent
    /// variable.
    ///
    /// `table` and `solver` must be the ones the model was fitted with. Rows
    /// dropped for missing values stay dropped; only the fitted rows of the
    /// regressor column are redrawn.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`HdregError::InvalidRitest`] | `reps` is 0 |
    /// | [`HdregError::Inference`] | `alpha` outside (0, 1) |
    /// | [`HdregError::UnknownCoefficient`] | `resampvar` is not a coefficient |
    /// | [`HdregError::Formula`] | `resampvar` is not a table column |
    /// | cluster, fit and covariance errors | as in [`Estimation::vcov`] and [`crate::feols`] |
    #[tracing::instrument(skip_all, fields(resampvar = %options.resampvar, reps = options.reps))]
    pub fn ritest<R: Rng>(
        &self,
        table: &ColumnTable,
        options: &RitestOptions,
        solver: Option<&dyn FixedEffectSolver>,
        rng: &mut R,
    ) -> Result<Vec<RitestResult>, HdregError> {
        options.validate()?;
        let name = options.resampvar();
        let coef = self
            .coef_names()
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| HdregError::UnknownCoefficient {
                name: name.to_string(),
            })?;
        let original = table
            .column(name)
            .ok_or_else(|| FormulaError::UnknownColumn {
                name: name.to_string(),
            })?
            .to_vec();

        let rows = self.design().kept_rows();
        if let Some(&row) = rows.iter().find(|&&r| r >= original.len()) {
            return Err(HdregError::TableMismatch {
                name: name.to_string(),
                len: original.len(),
                row,
            });
        }
        let mut support: Vec<f64> = rows.iter().map(|&r| original[r]).collect();
        support.sort_by(f64::total_cmp);
        support.dedup();

        let groups = match options.cluster() {
            Some(column) => Some(self.cluster_ids(table, column)?),
            None => None,
        };

        let observed = statistics(self, table, coef, options)?;
        let mut draws = vec![Vec::with_capacity(options.reps()); observed.len()];
        let mut resampled = table.clone();
        for rep in 0..options.reps() {
            let mut values = original.clone();
            match &groups {
                Some(ids) => {
                    let picks: Vec<f64> = (0..ids.n_groups())
                        .map(|_| support[rng.random_range(0..support.len())])
                        .collect();
                    for (&r, &g) in rows.iter().zip(ids.codes()) {
                        values[r] = picks[g];
                    }
                }
                None => {
                    for &r in rows {
                        values[r] = support[rng.random_range(0..support.len())];
                    }
                }
            }
            resampled.replace(name, values)?;
            let refit = Estimation::from_formula(self.formula().clone(), &resampled, solver)?;
            let stats = statistics(&refit, &resampled, coef, options)?;
            for (acc, stat) in draws.iter_mut().zip(stats) {
                acc.push(stat);
            }
            if (rep + 1) % 100 == 0 {
                debug!(done = rep + 1, "randomization draws");
            }
        }

        let z = normal_quantile(1.0 - options.alpha() / 2.0);
        let results: Vec<RitestResult> = self
            .depvar_names()
            .iter()
            .zip(observed)
            .zip(draws)
            .map(|((depvar, statistic), draws)| {
                let pvalue = pvalue(statistic, &draws, options.alternative());
                let pvalue_se = (pvalue * (1.0 - pvalue) / draws.len() as f64).sqrt();
                RitestResult {
                    depvar: depvar.clone(),
                    statistic,
                    pvalue,
                    pvalue_se,
                    ci_low: (pvalue - z * pvalue_se).max(0.0),
                    ci_high: (pvalue + z * pvalue_se).min(1.0),
                    draws,
                }
            })
            .collect();
        info!(
            n_support = support.len(),
            pvalue = results.first().map(|r| r.pvalue),
            "randomization test done"
        );
        Ok(results)
    }
}

/// The recorded statistic of coefficient `coef`, one per dependent variable.
fn statistics(
    est: &Estimation,
    table: &ColumnTable,
    coef: usize,
    options: &RitestOptions,
) -> Result<Vec<f64>, HdregError> {
    let regressions = est.fit().regressions();
    match options.statistic() {
        RiStatistic::Coef => Ok(regressions.iter().map(|r| r.beta_hat()[coef]).collect()),
        RiStatistic::Tstat => regressions
            .iter()
            .zip(est.vcov(options.vcov(), table)?)
            .map(|(r, v)| -> Result<f64, HdregError> { Ok(infer(r, &v)?.tstat()[coef]) })
            .collect(),
    }
}

fn pvalue(statistic: f64, draws: &[f64], alternative: Alternative) -> f64 {
    let extreme = draws
        .iter()
        .filter(|&&d| match alternative {
            Alternative::TwoSided => d.abs() >= statistic.abs(),
            Alternative::Right => d >= statistic,
            Alternative::Left => d <= statistic,
        })
        .count();
    extreme as f64 / draws.len() as f64
}
