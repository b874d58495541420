//! Error types for the hdreg-demean crate.

/// Error type for fixed-effect demeaning.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DemeanError {
    /// Returned when the inputs disagree on the number of observations.
    #[error("row count mismatch: FE has {fe} rows, Y has {y}, X has {x}")]
    RowCountMismatch {
        /// Rows in the group-id matrix.
        fe: usize,
        /// Rows in the outcome matrix.
        y: usize,
        /// Rows in the regressor matrix.
        x: usize,
    },

    /// Returned when the group-id matrix has no columns.
    #[error("fixed-effect matrix has no columns")]
    NoFixedEffects,

    /// Returned when a solver hands back a matrix of the wrong shape.
    #[error("solver returned a {got_rows}x{got_cols} matrix, expected {rows}x{cols}")]
    ShapeMismatch {
        /// Expected rows.
        rows: usize,
        /// Expected columns.
        cols: usize,
        /// Returned rows.
        got_rows: usize,
        /// Returned columns.
        got_cols: usize,
    },

    /// Returned when a solver stops before reaching its tolerance.
    #[error("demeaning did not converge after {iterations} iterations")]
    NotConverged {
        /// Iterations performed.
        iterations: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_row_count_mismatch() {
        let err = DemeanError::RowCountMismatch { fe: 3, y: 4, x: 4 };
        assert_eq!(
            err.to_string(),
            "row count mismatch: FE has 3 rows, Y has 4, X has 4"
        );
    }

    #[test]
    fn error_no_fixed_effects() {
        assert_eq!(
            DemeanError::NoFixedEffects.to_string(),
            "fixed-effect matrix has no columns"
        );
    }

    #[test]
    fn error_shape_mismatch() {
        let err = DemeanError::ShapeMismatch {
            rows: 10,
            cols: 3,
            got_rows: 10,
            got_cols: 2,
        };
        assert_eq!(
            err.to_string(),
            "solver returned a 10x2 matrix, expected 10x3"
        );
    }

    #[test]
    fn error_not_converged() {
        let err = DemeanError::NotConverged { iterations: 100_000 };
        assert_eq!(
            err.to_string(),
            "demeaning did not converge after 100000 iterations"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<DemeanError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<DemeanError>();
    }
}
