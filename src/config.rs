//! TOML configuration for a single estimation.

use std::path::Path;

use hdreg_vcov::VcovSpec;
use serde::Deserialize;

use crate::error::HdregError;

/// Top-level estimation configuration.
///
/// ```toml
/// formula = "wage ~ tenure + age | firm + year"
/// vcov = { CRV1 = "firm" }
/// alpha = 0.1
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimationConfig {
    /// Model formula, `depvars ~ regressors | fixed effects`.
    pub formula: String,

    /// Covariance estimator, in any of its external encodings.
    #[serde(default)]
    pub vcov: VcovSpec,

    /// Significance level for confidence intervals.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    0.05
}

impl EstimationConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`HdregError::Config`] with the parser message.
    pub fn from_toml_str(src: &str) -> Result<Self, HdregError> {
        toml::from_str(src).map_err(|e| HdregError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`HdregError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, HdregError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| HdregError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&src)
    }
}
