//! Error types for the hdreg-vcov crate.

use hdreg_ols::OlsError;

/// Error type for covariance specification and estimation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VcovError {
    /// Returned when a covariance name is not one of the supported types.
    #[error("unknown vcov type: {name:?} (expected iid, hetero, HC1, HC2 or HC3)")]
    UnknownType {
        /// The offending name.
        name: String,
    },

    /// Returned when a cluster specification uses a key other than CRV1/CRV3.
    #[error("unknown cluster vcov key: {key:?} (expected CRV1 or CRV3)")]
    UnknownClusterKey {
        /// The offending key.
        key: String,
    },

    /// Returned when a covariance specification has the wrong shape.
    #[error("invalid vcov specification: {reason}")]
    InvalidSpec {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a cluster estimator is requested without cluster ids.
    #[error("{kind} requires cluster ids")]
    MissingClusters {
        /// Name of the requested estimator.
        kind: String,
    },

    /// Returned when the cluster ids do not cover the fitted rows.
    #[error("cluster ids have length {clusters}, expected {n_obs}")]
    ClusterLengthMismatch {
        /// Length of the cluster id vector.
        clusters: usize,
        /// Number of fitted observations.
        n_obs: usize,
    },

    /// Returned when CRV3 is requested for a model with absorbed fixed effects.
    #[error("CRV3 inference is not supported with fixed effects")]
    Crv3WithFixedEffects,

    /// Returned when a cluster column holds NaN or infinity.
    #[error("cluster value at row {row} is not finite")]
    NonFiniteCluster {
        /// Row of the first offending value.
        row: usize,
    },

    /// Linear-algebra failure while computing a covariance.
    #[error(transparent)]
    Ols(#[from] OlsError),
}
