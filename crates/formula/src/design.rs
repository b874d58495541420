//! Aligned design matrices and the formula decomposer.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

use crate::builder::{DesignBuilder, MissingPolicy};
use crate::error::FormulaError;
use crate::formula::Formula;

/// Outcome, regressor and fixed-effect matrices sharing one row set.
///
/// Produced by [`decompose()`]. Rows holding a non-finite value in any of
/// the matrices have been removed from all of them.
#[derive(Debug, Clone)]
pub struct DesignMatrices {
    y: Array2<f64>,
    x: Array2<f64>,
    fe: Option<Array2<usize>>,
    depvar_names: Vec<String>,
    coef_names: Vec<String>,
    fixef_names: Vec<String>,
    na_index: Vec<usize>,
    kept_rows: Vec<usize>,
}

impl DesignMatrices {
    /// Returns the outcome matrix (N × M).
    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Returns the regressor matrix (N × K).
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Returns the fixed-effect group codes (N × F), if any.
    ///
    /// Codes in each column are dense, starting at 0.
    pub fn fe(&self) -> Option<&Array2<usize>> {
        self.fe.as_ref()
    }

    /// Returns `true` if fixed effects are present.
    pub fn has_fixef(&self) -> bool {
        self.fe.is_some()
    }

    /// Returns the dependent-variable names (length M).
    pub fn depvar_names(&self) -> &[String] {
        &self.depvar_names
    }

    /// Returns the regressor column names (length K).
    pub fn coef_names(&self) -> &[String] {
        &self.coef_names
    }

    /// Returns the fixed-effect names (empty without fixed effects).
    pub fn fixef_names(&self) -> &[String] {
        &self.fixef_names
    }

    /// Returns the sorted original row indices removed for missingness.
    pub fn na_index(&self) -> &[usize] {
        &self.na_index
    }

    /// Returns the sorted original row indices that were kept.
    pub fn kept_rows(&self) -> &[usize] {
        &self.kept_rows
    }

    /// Returns the number of observations N.
    pub fn n_obs(&self) -> usize {
        self.y.nrows()
    }

    /// Consumes the design and returns `(Y, X, FE)`.
    pub fn into_matrices(self) -> (Array2<f64>, Array2<f64>, Option<Array2<usize>>) {
        (self.y, self.x, self.fe)
    }
}

/// Decomposes `formula` into aligned design matrices built by `builder`.
///
/// Y, X and (when the formula has a `|` segment) the fixed-effect matrix
/// are built separately with [`MissingPolicy::Keep`]. The rows holding a
/// non-finite value in each matrix are collected independently, their union
/// is removed from all matrices, and fixed-effect columns are recoded to
/// dense group ids.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`FormulaError::RowCountMismatch`] | the builder returns matrices of different heights |
/// | [`FormulaError::NoObservations`] | every row holds a missing value |
/// | any builder error | unknown columns or unsupported terms |
#[tracing::instrument(skip_all, fields(formula = %formula))]
pub fn decompose<B>(formula: &Formula, builder: &B) -> Result<DesignMatrices, FormulaError>
where
    B: DesignBuilder + ?Sized,
{
    let y = builder.build(&formula.depvar_formula(), MissingPolicy::Keep)?;
    let x = builder.build(&formula.regressor_formula(), MissingPolicy::Keep)?;
    let fe = match formula.fixef_formula() {
        Some(f) => Some(builder.build(&f, MissingPolicy::Keep)?),
        None => None,
    };

    let n = y.n_rows();
    let fe_rows = fe.as_ref().map_or(n, |m| m.n_rows());
    if x.n_rows() != n || fe_rows != n {
        return Err(FormulaError::RowCountMismatch {
            y: n,
            x: x.n_rows(),
            fe: fe_rows,
        });
    }

    let mut na: BTreeSet<usize> = non_finite_rows(y.values().view());
    na.extend(non_finite_rows(x.values().view()));
    if let Some(fe) = &fe {
        na.extend(non_finite_rows(fe.values().view()));
    }

    let kept_rows: Vec<usize> = (0..n).filter(|i| !na.contains(i)).collect();
    let na_index: Vec<usize> = na.into_iter().collect();
    if kept_rows.is_empty() {
        return Err(FormulaError::NoObservations {
            dropped: na_index.len(),
        });
    }
    debug!(
        n_rows = n,
        n_dropped = na_index.len(),
        "removed rows with missing values"
    );

    let (y_values, depvar_names) = y.into_parts();
    let (x_values, coef_names) = x.into_parts();
    let y_values = y_values.select(Axis(0), &kept_rows);
    let x_values = x_values.select(Axis(0), &kept_rows);

    let (fe_codes, fixef_names) = match fe {
        Some(fe) => {
            let (values, names) = fe.into_parts();
            let values = values.select(Axis(0), &kept_rows);
            (Some(group_codes(values.view())), names)
        }
        None => (None, Vec::new()),
    };

    Ok(DesignMatrices {
        y: y_values,
        x: x_values,
        fe: fe_codes,
        depvar_names,
        coef_names,
        fixef_names,
        na_index,
        kept_rows,
    })
}

/// Indices of rows holding at least one non-finite value.
fn non_finite_rows(m: ArrayView2<'_, f64>) -> BTreeSet<usize> {
    m.axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().any(|v| !v.is_finite()))
        .map(|(i, _)| i)
        .collect()
}

/// Recodes every column of group labels to dense ids.
fn group_codes(labels: ArrayView2<'_, f64>) -> Array2<usize> {
    let mut codes = Array2::<usize>::zeros(labels.dim());
    for (j, col) in labels.axis_iter(Axis(1)).enumerate() {
        let (col_codes, _) = hdreg_stats::factorize(&col.to_vec());
        for (dst, code) in codes.column_mut(j).iter_mut().zip(col_codes) {
            *dst = code;
        }
    }
    codes
}
