//! Multi-outcome ordinary least squares.
//!
//! All outcome columns share one regressor matrix, so `(X'X)⁻¹` is formed a
//! single time and reused:
//!
//! ```text
//! fit(X, Y)
//!   ├─ rank check on X'X (SVD)
//!   ├─ (X'X)⁻¹               (Cholesky, LU fallback)
//!   ├─ B = (X'X)⁻¹ X'Y        (K × M)
//!   └─ per column m → Regression { beta_hat, fitted, residual }
//! ```
//!
//! The [`linalg`] module also hosts the `ndarray`/`nalgebra` bridge and the
//! pseudo-inverse used by the cluster jackknife.

mod error;
mod fit;
pub mod linalg;

pub use error::OlsError;
pub use fit::{FitResult, Regression, fit};
