//! Error types for the hdreg-inference crate.

/// Error type for inference on fitted coefficients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    /// Returned when a significance level lies outside (0, 1).
    #[error("alpha must be in (0, 1), got {alpha}")]
    InvalidAlpha {
        /// The offending value.
        alpha: f64,
    },

    /// Returned when coefficients and covariance disagree on K.
    #[error("{coef} coefficients but a {vcov}x{vcov} covariance matrix")]
    DimensionMismatch {
        /// Number of coefficients.
        coef: usize,
        /// Side of the covariance matrix.
        vcov: usize,
    },
}
