//! Goodness of fit.

use hdreg_ols::Regression;
use hdreg_stats::{sum_of_squares, total_sum_of_squares};

/// R² and adjusted R² of one regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    r_squared: f64,
    adj_r_squared: f64,
}

impl Performance {
    /// `1 − Σu² / Σ(y − ȳ)²`.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// `1 − (1 − R²)(n − 1)/(n − k)`.
    pub fn adj_r_squared(&self) -> f64 {
        self.adj_r_squared
    }
}

/// Computes R² on the outcome the regression was fitted to.
///
/// When fixed effects were absorbed that outcome is demeaned, so the result
/// is the within R². A constant outcome yields a non-finite R².
pub fn summarize(regression: &Regression, k: usize) -> Performance {
    let n = regression.n_obs() as f64;
    let ssr = sum_of_squares(&regression.residual().to_vec());
    let sst = total_sum_of_squares(&regression.y().to_vec());
    let r_squared = 1.0 - ssr / sst;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1.0) / (n - k as f64);
    Performance {
        r_squared,
        adj_r_squared,
    }
}
