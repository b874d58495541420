//! Coefficient covariance estimators for fitted OLS regressions.
//!
//! | Type | Meat | Correction |
//! |------|------|------------|
//! | iid | none, `mean(u²) · (X'X)⁻¹` | 1 |
//! | HC1 / hetero | `X' diag(u²) X` | `n/(n−k)` |
//! | HC2 | `X' diag(u²/(1−h)) X` | 1 |
//! | HC3 | `X' diag(u²/(1−h)²) X` | 1 |
//! | CRV1 | `Σ_g (X_g'u_g)(X_g'u_g)'` | `G/(G−1) · (n−1)/(n−k)` |
//! | CRV3 | leave-one-cluster-out jackknife | `(G−1)/G` |
//!
//! Sandwich estimators return `cc · (X'X)⁻¹ · meat · (X'X)⁻¹`; `h` is the
//! leverage `x_i'(X'X)⁻¹x_i`. Specifications arrive as [`VcovSpec`], decoded
//! from strings or one-entry maps; the estimators take the column-free
//! [`VcovType`] plus resolved [`ClusterIds`].

mod cluster;
mod error;
mod estimator;
mod spec;

pub use cluster::ClusterIds;
pub use error::VcovError;
pub use estimator::{Vcov, vcov, vcov_all};
pub use spec::{CrvType, HcType, VcovSpec, VcovType};
