//! Error types for the hdreg-ols crate.

/// Error type for OLS fitting and the linear-algebra helpers behind it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OlsError {
    /// Returned when the design has no rows or no columns.
    #[error("design matrix is empty ({rows}x{cols})")]
    EmptyDesign {
        /// Rows in X.
        rows: usize,
        /// Columns in X.
        cols: usize,
    },

    /// Returned when X and Y disagree on the number of observations.
    #[error("X has {x_rows} rows but Y has {y_rows}")]
    DimensionMismatch {
        /// Rows in X.
        x_rows: usize,
        /// Rows in Y.
        y_rows: usize,
    },

    /// Returned when X does not have full column rank.
    #[error("regressor matrix is rank deficient: rank {rank} < {k} columns")]
    RankDeficient {
        /// Numerical rank of X'X.
        rank: usize,
        /// Number of regressors.
        k: usize,
    },

    /// Returned when a matrix is not square where a square one is required.
    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare {
        /// Rows.
        rows: usize,
        /// Columns.
        cols: usize,
    },

    /// Returned when a decomposition fails inside the linear-algebra backend.
    #[error("linear algebra failure: {reason}")]
    Linalg {
        /// Backend message.
        reason: String,
    },
}
