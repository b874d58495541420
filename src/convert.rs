//! Pure conversion functions: TOML config structs -> crate API types.

use hdreg_formula::Formula;
use hdreg_vcov::VcovSpec;

use crate::config::EstimationConfig;
use crate::error::HdregError;

/// Validated inputs for one estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationPlan {
    /// Parsed formula.
    pub formula: Formula,
    /// Covariance estimator.
    pub vcov: VcovSpec,
    /// Significance level in (0, 1).
    pub alpha: f64,
}

/// Parses a covariance name (`iid`, `hetero`, `HC1`, `HC2`, `HC3`).
///
/// Cluster estimators need a column and are written as a one-entry table in
/// TOML instead.
pub fn parse_vcov(s: &str) -> Result<VcovSpec, HdregError> {
    Ok(s.parse::<VcovSpec>()?)
}

/// Checks that a significance level lies strictly between 0 and 1.
pub fn parse_alpha(alpha: f64) -> Result<f64, HdregError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(HdregError::Config(format!(
            "alpha must be in (0, 1), got {alpha}"
        )))
    }
}

/// Builds an [`EstimationPlan`] from the TOML configuration.
pub fn build_plan(config: &EstimationConfig) -> Result<EstimationPlan, HdregError> {
    Ok(EstimationPlan {
        formula: Formula::parse(&config.formula)?,
        vcov: config.vcov.clone(),
        alpha: parse_alpha(config.alpha)?,
    })
}
