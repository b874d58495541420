//! The estimation pipeline: formula to fitted model to reports.

use hdreg_demean::{FixedEffectSolver, demean};
use hdreg_formula::{ColumnTable, DesignMatrices, Formula, decompose};
use hdreg_inference::InferenceError;
use hdreg_ols::{FitResult, fit};
use hdreg_vcov::{ClusterIds, CrvType, Vcov, VcovError, VcovSpec, VcovType, vcov_all};
use tracing::{debug, info};

use crate::config::EstimationConfig;
use crate::convert;
use crate::error::HdregError;
use crate::report::RegressionReport;

/// Significance level used by [`Estimation::report`].
pub const DEFAULT_ALPHA: f64 = 0.05;

/// A fitted model: the aligned design and the OLS fit on it.
///
/// Immutable once built; covariance and reports are computed on demand, so
/// one estimation can be reported under several covariance specifications.
#[derive(Debug, Clone)]
pub struct Estimation {
    formula: Formula,
    design: DesignMatrices,
    fit: FitResult,
}

/// Parses `formula` and fits it on `table`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`HdregError::Formula`] | bad formula, unknown column, no rows left |
/// | [`HdregError::MissingSolver`] | fixed effects without `solver` |
/// | [`HdregError::Demean`] | solver failure |
/// | [`HdregError::Ols`] | rank-deficient or empty design |
#[tracing::instrument(skip_all, fields(formula = %formula))]
pub fn feols(
    formula: &str,
    table: &ColumnTable,
    solver: Option<&dyn FixedEffectSolver>,
) -> Result<Estimation, HdregError> {
    Estimation::from_formula(Formula::parse(formula)?, table, solver)
}

/// Runs a configured estimation end to end.
///
/// # Errors
///
/// [`HdregError::Config`] for an invalid configuration, otherwise as
/// [`feols`] and [`Estimation::report_with_alpha`].
pub fn run(
    config: &EstimationConfig,
    table: &ColumnTable,
    solver: Option<&dyn FixedEffectSolver>,
) -> Result<Vec<RegressionReport>, HdregError> {
    let plan = convert::build_plan(config)?;
    info!(formula = %plan.formula, vcov = %plan.vcov, "running estimation");
    let est = Estimation::from_formula(plan.formula, table, solver)?;
    est.report_with_alpha(&plan.vcov, table, plan.alpha)
}

impl Estimation {
    /// Fits an already-parsed formula.
    ///
    /// # Errors
    ///
    /// As [`feols`].
    pub fn from_formula(
        formula: Formula,
        table: &ColumnTable,
        solver: Option<&dyn FixedEffectSolver>,
    ) -> Result<Self, HdregError> {
        if formula.has_fixef() && solver.is_none() {
            return Err(HdregError::MissingSolver);
        }
        let design = decompose(&formula, table)?;

        let result = match design.fe() {
            Some(fe) => {
                let solver = solver.ok_or(HdregError::MissingSolver)?;
                let demeaned = demean(solver, fe.view(), design.y().view(), design.x().view())?;
                fit(demeaned.x().view(), demeaned.y().view(), true)?
            }
            None => fit(design.x().view(), design.y().view(), false)?,
        };
        info!(
            n_obs = result.n_obs(),
            n_coef = result.n_coef(),
            n_depvars = result.n_depvars(),
            n_dropped = design.na_index().len(),
            "model fitted"
        );

        Ok(Self {
            formula,
            design,
            fit: result,
        })
    }

    /// Parsed formula.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Aligned, untransformed design matrices.
    pub fn design(&self) -> &DesignMatrices {
        &self.design
    }

    /// OLS fit (on demeaned data when fixed effects were absorbed).
    pub fn fit(&self) -> &FitResult {
        &self.fit
    }

    /// Regressor names.
    pub fn coef_names(&self) -> &[String] {
        self.design.coef_names()
    }

    /// Dependent variable names.
    pub fn depvar_names(&self) -> &[String] {
        self.design.depvar_names()
    }

    /// Number of observations used.
    pub fn n_obs(&self) -> usize {
        self.fit.n_obs()
    }

    /// Whether fixed effects were absorbed.
    pub fn has_fixef(&self) -> bool {
        self.fit.has_fixef()
    }

    /// Table rows dropped for non-finite values.
    pub fn na_index(&self) -> &[usize] {
        self.design.na_index()
    }

    /// Cluster ids for the fitted rows, read from `column` of `table`.
    ///
    /// `table` must be the one the model was fitted on.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`HdregError::UnknownClusterColumn`] | `column` not in `table` |
    /// | [`HdregError::TableMismatch`] | `table` shorter than the fitted rows |
    /// | [`HdregError::Vcov`] | non-finite cluster value |
    pub fn cluster_ids(&self, table: &ColumnTable, column: &str) -> Result<ClusterIds, HdregError> {
        let values = table
            .column(column)
            .ok_or_else(|| HdregError::UnknownClusterColumn {
                name: column.to_string(),
            })?;
        let kept = self
            .design
            .kept_rows()
            .iter()
            .map(|&row| {
                values
                    .get(row)
                    .copied()
                    .ok_or_else(|| HdregError::TableMismatch {
                        name: column.to_string(),
                        len: values.len(),
                        row,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ids = ClusterIds::from_values(&kept)?;
        debug!(column, n_groups = ids.n_groups(), "cluster ids resolved");
        Ok(ids)
    }

    /// One covariance per dependent variable under `spec`.
    ///
    /// CRV3 on a model with fixed effects is rejected before the cluster
    /// column is looked at.
    ///
    /// # Errors
    ///
    /// Cluster resolution errors as in [`cluster_ids`](Self::cluster_ids);
    /// estimator errors as [`HdregError::Vcov`].
    pub fn vcov(&self, spec: &VcovSpec, table: &ColumnTable) -> Result<Vec<Vcov>, HdregError> {
        if spec.kind() == VcovType::Cluster(CrvType::Crv3) && self.has_fixef() {
            return Err(VcovError::Crv3WithFixedEffects.into());
        }
        let clusters = match spec.cluster() {
            Some(column) => Some(self.cluster_ids(table, column)?),
            None => None,
        };
        Ok(vcov_all(&self.fit, spec.kind(), clusters.as_ref())?)
    }

    /// Reports at the default significance level of 0.05.
    ///
    /// # Errors
    ///
    /// As [`report_with_alpha`](Self::report_with_alpha).
    pub fn report(
        &self,
        spec: &VcovSpec,
        table: &ColumnTable,
    ) -> Result<Vec<RegressionReport>, HdregError> {
        self.report_with_alpha(spec, table, DEFAULT_ALPHA)
    }

    /// One [`RegressionReport`] per dependent variable, in formula order.
    ///
    /// # Errors
    ///
    /// [`HdregError::Inference`] for `alpha` outside (0, 1), otherwise as
    /// [`vcov`](Self::vcov).
    pub fn report_with_alpha(
        &self,
        spec: &VcovSpec,
        table: &ColumnTable,
        alpha: f64,
    ) -> Result<Vec<RegressionReport>, HdregError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(InferenceError::InvalidAlpha { alpha }.into());
        }
        let vcovs = self.vcov(spec, table)?;
        self.fit
            .regressions()
            .iter()
            .zip(vcovs)
            .zip(self.depvar_names())
            .map(|((reg, v), depvar)| {
                RegressionReport::new(depvar.as_str(), self.coef_names().to_vec(), reg, v, alpha)
            })
            .collect()
    }
}
