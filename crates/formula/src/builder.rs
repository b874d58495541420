//! Contract for turning a sub-formula into a numeric matrix.

use ndarray::Array2;

use crate::error::FormulaError;

/// How a design builder treats rows holding non-finite values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Keep every row; non-finite values are passed through.
    #[default]
    Keep,
    /// Remove rows holding any non-finite value.
    Drop,
}

/// A numeric matrix with ordered column names, as produced by a
/// [`DesignBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMatrix {
    values: Array2<f64>,
    names: Vec<String>,
}

impl ModelMatrix {
    /// Creates a model matrix.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Syntax`] if the number of names does not
    /// match the number of columns.
    pub fn new(values: Array2<f64>, names: Vec<String>) -> Result<Self, FormulaError> {
        if values.ncols() != names.len() {
            return Err(FormulaError::Syntax {
                formula: names.join(" + "),
                reason: format!(
                    "{} column names for {} columns",
                    names.len(),
                    values.ncols()
                ),
            });
        }
        Ok(Self { values, names })
    }

    /// Returns the numeric values (rows × columns).
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Returns the column names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Consumes the matrix and returns its values and names.
    pub fn into_parts(self) -> (Array2<f64>, Vec<String>) {
        (self.values, self.names)
    }
}

/// Builds numeric matrices from one-sided sub-formulas over a data source.
///
/// Implementations follow the usual conventions: an intercept column is
/// included unless the sub-formula carries `0` or `- 1`.
pub trait DesignBuilder {
    /// Builds the matrix described by `formula`.
    fn build(&self, formula: &str, missing: MissingPolicy) -> Result<ModelMatrix, FormulaError>;
}
