//! Error types for the hdreg-formula crate.

/// Error type for all fallible operations in the hdreg-formula crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FormulaError {
    /// Returned when a formula string does not follow
    /// `"<depvars> ~ <regressors> [| <fixedeffects>]"`.
    #[error("invalid formula {formula:?}: {reason}")]
    Syntax {
        /// The offending formula or sub-formula.
        formula: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when a formula references a column the table does not hold.
    #[error("unknown column {name:?}")]
    UnknownColumn {
        /// Name of the missing column.
        name: String,
    },

    /// Returned when a column is added whose length differs from the table.
    #[error("column {name:?} has {len} rows, expected {expected}")]
    ColumnLength {
        /// Name of the rejected column.
        name: String,
        /// Length of the rejected column.
        len: usize,
        /// Row count of the table.
        expected: usize,
    },

    /// Returned when a column name is inserted twice.
    #[error("duplicate column {name:?}")]
    DuplicateColumn {
        /// Name of the duplicated column.
        name: String,
    },

    /// Returned when the design builder hands back matrices of different
    /// row counts.
    #[error("design matrices disagree on row count: Y has {y}, X has {x}, FE has {fe}")]
    RowCountMismatch {
        /// Rows in the outcome matrix.
        y: usize,
        /// Rows in the regressor matrix.
        x: usize,
        /// Rows in the fixed-effect matrix (equal to `y` when absent).
        fe: usize,
    },

    /// Returned when every row is removed by missing-value filtering.
    #[error("no observations left after removing {dropped} rows with missing values")]
    NoObservations {
        /// Number of rows removed.
        dropped: usize,
    },
}
