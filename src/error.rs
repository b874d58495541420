//! Error type for the estimation pipeline.

use hdreg_demean::DemeanError;
use hdreg_formula::FormulaError;
use hdreg_inference::InferenceError;
use hdreg_ols::OlsError;
use hdreg_vcov::VcovError;

/// Any failure along `formula → design → demean → fit → vcov → report`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HdregError {
    /// Formula parsing or design assembly failed.
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Fixed-effect demeaning failed.
    #[error(transparent)]
    Demean(#[from] DemeanError),

    /// OLS fitting failed.
    #[error(transparent)]
    Ols(#[from] OlsError),

    /// Covariance specification or estimation failed.
    #[error(transparent)]
    Vcov(#[from] VcovError),

    /// Inference on the coefficients failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Returned when the formula absorbs fixed effects but no solver was given.
    #[error("formula has fixed effects but no fixed-effect solver was supplied")]
    MissingSolver,

    /// Returned when the cluster column is not in the table.
    #[error("unknown cluster column: {name:?}")]
    UnknownClusterColumn {
        /// Requested column.
        name: String,
    },

    /// Returned when the table is shorter than the rows the model was fitted on.
    #[error("column {name:?} has {len} rows but the fit uses row {row}")]
    TableMismatch {
        /// Column being read.
        name: String,
        /// Rows in the column.
        len: usize,
        /// First fitted row that is out of range.
        row: usize,
    },

    /// Returned when a randomization test names a regressor the model lacks.
    #[error("unknown coefficient: {name:?}")]
    UnknownCoefficient {
        /// Requested coefficient.
        name: String,
    },

    /// Returned when randomization-test options are invalid.
    #[error("invalid randomization test: {reason}")]
    InvalidRitest {
        /// What is wrong.
        reason: String,
    },

    /// Returned when a configuration cannot be read or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_missing_solver() {
        assert_eq!(
            HdregError::MissingSolver.to_string(),
            "formula has fixed effects but no fixed-effect solver was supplied"
        );
    }

    #[test]
    fn error_unknown_cluster_column() {
        let err = HdregError::UnknownClusterColumn {
            name: "firm".to_string(),
        };
        assert_eq!(err.to_string(), "unknown cluster column: \"firm\"");
    }

    #[test]
    fn error_table_mismatch() {
        let err = HdregError::TableMismatch {
            name: "firm".to_string(),
            len: 4,
            row: 7,
        };
        assert_eq!(
            err.to_string(),
            "column \"firm\" has 4 rows but the fit uses row 7"
        );
    }

    #[test]
    fn error_unknown_coefficient() {
        let err = HdregError::UnknownCoefficient {
            name: "treat".to_string(),
        };
        assert_eq!(err.to_string(), "unknown coefficient: \"treat\"");
    }

    #[test]
    fn error_invalid_ritest() {
        let err = HdregError::InvalidRitest {
            reason: "reps must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid randomization test: reps must be at least 1"
        );
    }

    #[test]
    fn error_config() {
        let err = HdregError::Config("missing field `formula`".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: missing field `formula`"
        );
    }

    #[test]
    fn error_wraps_crate_errors() {
        let err = HdregError::from(VcovError::Crv3WithFixedEffects);
        assert!(matches!(err, HdregError::Vcov(VcovError::Crv3WithFixedEffects)));
        assert_eq!(
            err.to_string(),
            "CRV3 inference is not supported with fixed effects"
        );

        let err = HdregError::from(OlsError::RankDeficient { rank: 1, k: 2 });
        assert!(matches!(err, HdregError::Ols(_)));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<HdregError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<HdregError>();
    }
}
