//! Residualizing outcome and regressors on the fixed-effect subspace.

use ndarray::{Array2, ArrayView2, Axis, concatenate, s};
use tracing::debug;

use crate::error::DemeanError;

/// Projects columns off a multi-way fixed-effect subspace.
///
/// Given an N×F matrix of dense group ids (one column per fixed effect) and
/// an N×C numeric matrix, an implementation returns an N×C matrix whose
/// every column is the residual of the corresponding input column after
/// orthogonal projection onto the space spanned by the group indicators.
/// Convergence tolerance and iteration limits are the implementation's
/// business; failing to converge is reported as
/// [`DemeanError::NotConverged`].
pub trait FixedEffectSolver {
    /// Demeans every column of `values` with respect to `groups`.
    fn demean(
        &self,
        groups: ArrayView2<'_, usize>,
        values: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, DemeanError>;
}

impl<S: FixedEffectSolver + ?Sized> FixedEffectSolver for &S {
    fn demean(
        &self,
        groups: ArrayView2<'_, usize>,
        values: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, DemeanError> {
        (**self).demean(groups, values)
    }
}

/// Demeaned outcome and regressor matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Demeaned {
    y: Array2<f64>,
    x: Array2<f64>,
}

impl Demeaned {
    /// Returns the demeaned outcome matrix (N × M).
    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Returns the demeaned regressor matrix (N × K).
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Consumes the value and returns `(Y, X)`.
    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.y, self.x)
    }
}

/// Demeans Y and X in one solver call.
///
/// Y (N×M) and X (N×K) are placed side by side, handed to `solver` as one
/// N×(M+K) matrix, and the result is split back into its first M and
/// remaining K columns.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`DemeanError::NoFixedEffects`] | `fe` has no columns |
/// | [`DemeanError::RowCountMismatch`] | `fe`, `y` and `x` differ in height |
/// | [`DemeanError::ShapeMismatch`] | the solver returns a different shape |
/// | any solver error | e.g. [`DemeanError::NotConverged`] |
#[tracing::instrument(skip_all, fields(n_obs = y.nrows(), n_fe = fe.ncols()))]
pub fn demean<S>(
    solver: &S,
    fe: ArrayView2<'_, usize>,
    y: ArrayView2<'_, f64>,
    x: ArrayView2<'_, f64>,
) -> Result<Demeaned, DemeanError>
where
    S: FixedEffectSolver + ?Sized,
{
    if fe.ncols() == 0 {
        return Err(DemeanError::NoFixedEffects);
    }
    let mismatch = || DemeanError::RowCountMismatch {
        fe: fe.nrows(),
        y: y.nrows(),
        x: x.nrows(),
    };
    if fe.nrows() != y.nrows() || y.nrows() != x.nrows() {
        return Err(mismatch());
    }

    let m = y.ncols();
    let yx = concatenate(Axis(1), &[y.view(), x.view()]).map_err(|_| mismatch())?;
    let (rows, cols) = yx.dim();

    let out = solver.demean(fe, yx.view())?;
    if out.dim() != (rows, cols) {
        return Err(DemeanError::ShapeMismatch {
            rows,
            cols,
            got_rows: out.nrows(),
            got_cols: out.ncols(),
        });
    }
    debug!(n_cols = cols, "demeaned outcome and regressors");

    Ok(Demeaned {
        y: out.slice(s![.., ..m]).to_owned(),
        x: out.slice(s![.., m..]).to_owned(),
    })
}
