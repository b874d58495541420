//! Dense cluster codes for cluster-robust estimators.

use hdreg_stats::factorize;

use crate::error::VcovError;

/// Cluster membership of every fitted observation.
///
/// Codes are dense in `0..n_groups` and assigned in order of first
/// appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIds {
    codes: Vec<usize>,
    n_groups: usize,
}

impl ClusterIds {
    /// Factorizes a numeric cluster column.
    ///
    /// # Errors
    ///
    /// [`VcovError::NonFiniteCluster`] naming the first NaN or infinite value.
    pub fn from_values(values: &[f64]) -> Result<Self, VcovError> {
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(VcovError::NonFiniteCluster { row });
        }
        let (codes, n_groups) = factorize(values);
        Ok(Self { codes, n_groups })
    }

    /// Cluster code per observation.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Number of distinct clusters G.
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of observations covered.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no observation is covered.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Row indices belonging to each cluster, indexed by code.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.n_groups];
        for (row, &g) in self.codes.iter().enumerate() {
            out[g].push(row);
        }
        out
    }
}
