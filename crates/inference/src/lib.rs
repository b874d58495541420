//! Inference and goodness of fit for fitted regressions.
//!
//! [`infer`] turns a coefficient covariance into standard errors,
//! z-statistics and two-sided normal p-values; [`summarize`] reports R² and
//! adjusted R².

mod error;
mod inference;
mod performance;

pub use error::InferenceError;
pub use inference::{ConfidenceInterval, Inference, infer};
pub use performance::{Performance, summarize};
