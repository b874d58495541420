//! Fixed-effect demeaning orchestration.
//!
//! When a model absorbs fixed effects, outcome and regressors are replaced by
//! their residuals after projection onto the fixed-effect subspace before
//! any fitting happens. The projection itself is delegated to a
//! [`FixedEffectSolver`] (typically an alternating-projections
//! implementation); this crate only handles the bookkeeping around it:
//!
//! ```text
//! demean()
//!   ├─ validate row counts
//!   ├─ [Y | X]               (N × (M + K))
//!   ├─ solver.demean(FE, ·)  (N × (M + K))
//!   └─ split → Demeaned { y: N × M, x: N × K }
//! ```

mod demean;
mod error;

pub use demean::{Demeaned, FixedEffectSolver, demean};
pub use error::DemeanError;
