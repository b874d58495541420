//! Linear regression with high-dimensional fixed effects.
//!
//! `hdreg` fits `y ~ X` by OLS after optionally absorbing one or more
//! fixed effects, and reports coefficients under iid,
//! heteroskedasticity-robust (HC1/HC2/HC3) and cluster-robust (CRV1/CRV3)
//! covariance estimators.
//!
//! # Pipeline
//!
//! ```text
//! feols(formula, table, solver)
//!   ├─ Formula::parse              hdreg-formula
//!   ├─ decompose → Y, X, FE        hdreg-formula   (shared non-finite row drop)
//!   ├─ demean(FE; Y, X)            hdreg-demean    (only with `| fe`)
//!   └─ fit(X, Y)                   hdreg-ols
//! Estimation::report(vcov, table)
//!   ├─ vcov_all                    hdreg-vcov
//!   ├─ infer                       hdreg-inference
//!   └─ summarize                   hdreg-inference
//! Estimation::ritest(table, options, solver, rng)
//!   └─ redraw one regressor, refit, compare statistics
//! ```
//!
//! The fixed-effect projection itself is supplied by the caller through
//! [`FixedEffectSolver`].
//!
//! # Quick start
//!
//! ```
//! use hdreg::{ColumnTable, VcovSpec, feols};
//!
//! let table = ColumnTable::new()
//!     .with_column("y", vec![5.1, 7.9, 11.2, 13.8, 17.1]).unwrap()
//!     .with_column("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//!
//! let est = feols("y ~ x", &table, None).unwrap();
//! let reports = est.report(&VcovSpec::Iid, &table).unwrap();
//! let slope = reports[0].coef("x").unwrap();
//! assert!((slope - 3.0).abs() < 0.1);
//! ```

pub mod config;
pub mod convert;
mod error;
mod estimate;
mod report;
mod ritest;

pub use config::EstimationConfig;
pub use error::HdregError;
pub use estimate::{DEFAULT_ALPHA, Estimation, feols, run};
pub use report::{RegressionReport, TidyRow};
pub use ritest::{Alternative, RiStatistic, RitestOptions, RitestResult};

pub use hdreg_demean::{DemeanError, FixedEffectSolver};
pub use hdreg_formula::{ColumnTable, DesignBuilder, Formula, FormulaError, MissingPolicy};
pub use hdreg_inference::{ConfidenceInterval, Inference, InferenceError, Performance};
pub use hdreg_ols::OlsError;
pub use hdreg_vcov::{ClusterIds, CrvType, HcType, Vcov, VcovError, VcovSpec, VcovType};
