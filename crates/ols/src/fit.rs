//! Closed-form least squares over one shared regressor matrix.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use crate::error::OlsError;
use crate::linalg::invert_full_rank;

/// One fitted outcome column.
///
/// Every vector is in fitted space: when fixed effects were absorbed, `y`,
/// `fitted` and `residual` refer to the demeaned outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    index: usize,
    y: Array1<f64>,
    beta_hat: Array1<f64>,
    fitted: Array1<f64>,
    residual: Array1<f64>,
}

impl Regression {
    /// Position of this outcome among the dependent variables.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Outcome the coefficients were fitted to (N).
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Estimated coefficients (K).
    pub fn beta_hat(&self) -> &Array1<f64> {
        &self.beta_hat
    }

    /// `X · beta_hat` (N).
    pub fn fitted(&self) -> &Array1<f64> {
        &self.fitted
    }

    /// `y − fitted` (N).
    pub fn residual(&self) -> &Array1<f64> {
        &self.residual
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    /// Number of coefficients.
    pub fn n_coef(&self) -> usize {
        self.beta_hat.len()
    }
}

/// Shared design plus one [`Regression`] per outcome column.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    x: Array2<f64>,
    xtx_inv: Array2<f64>,
    regressions: Vec<Regression>,
    has_fixef: bool,
}

impl FitResult {
    /// Regressor matrix used for the fit (N × K).
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// `(X'X)⁻¹` (K × K).
    pub fn xtx_inv(&self) -> &Array2<f64> {
        &self.xtx_inv
    }

    /// All per-outcome fits, in outcome order.
    pub fn regressions(&self) -> &[Regression] {
        &self.regressions
    }

    /// Fit for outcome `index`, if it exists.
    pub fn regression(&self, index: usize) -> Option<&Regression> {
        self.regressions.get(index)
    }

    /// Whether X and Y were demeaned on fixed effects before fitting.
    pub fn has_fixef(&self) -> bool {
        self.has_fixef
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of coefficients.
    pub fn n_coef(&self) -> usize {
        self.x.ncols()
    }

    /// Number of outcome columns.
    pub fn n_depvars(&self) -> usize {
        self.regressions.len()
    }
}

/// Fits `y_m = X β_m + u_m` for every column m of `y`.
///
/// `(X'X)⁻¹` is computed once and shared across outcomes; for each column
/// `β = (X'X)⁻¹ X'y`, `fitted = X β` and `residual = y − fitted`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`OlsError::EmptyDesign`] | X has zero rows or zero columns |
/// | [`OlsError::DimensionMismatch`] | X and Y differ in height |
/// | [`OlsError::RankDeficient`] | X'X is numerically singular (includes K > N) |
#[tracing::instrument(skip_all, fields(n_obs = x.nrows(), n_coef = x.ncols(), n_depvars = y.ncols()))]
pub fn fit(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    has_fixef: bool,
) -> Result<FitResult, OlsError> {
    let (n, k) = x.dim();
    if n == 0 || k == 0 {
        return Err(OlsError::EmptyDesign { rows: n, cols: k });
    }
    if y.nrows() != n {
        return Err(OlsError::DimensionMismatch {
            x_rows: n,
            y_rows: y.nrows(),
        });
    }

    let xtx = x.t().dot(&x);
    let xtx_inv = invert_full_rank(xtx.view())?;
    let beta = xtx_inv.dot(&x.t().dot(&y));

    let regressions = y
        .axis_iter(Axis(1))
        .zip(beta.axis_iter(Axis(1)))
        .enumerate()
        .map(|(index, (y_m, beta_m))| regress_one(index, x, y_m, beta_m))
        .collect::<Vec<_>>();
    debug!(n_regressions = regressions.len(), "fitted OLS");

    Ok(FitResult {
        x: x.to_owned(),
        xtx_inv,
        regressions,
        has_fixef,
    })
}

fn regress_one(
    index: usize,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    beta: ArrayView1<'_, f64>,
) -> Regression {
    let fitted = x.dot(&beta);
    let residual = &y - &fitted;
    Regression {
        index,
        y: y.to_owned(),
        beta_hat: beta.to_owned(),
        fitted,
        residual,
    }
}
