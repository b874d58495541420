//! Formula decomposition and aligned design-matrix assembly.
//!
//! A model is written as
//!
//! ```text
//! y1 + y2 ~ x1 + x2 | fe1 + fe2
//! ```
//!
//! where the `| ...` fixed-effect segment is optional. [`decompose()`] turns
//! a parsed [`Formula`] into a [`DesignMatrices`] value holding the outcome
//! matrix Y, the regressor matrix X and, when present, the fixed-effect group
//! codes FE, all restricted to the same rows.
//!
//! # Architecture
//!
//! ```text
//! decompose()
//!   ├─ Formula::depvar_formula()     → builder → Y
//!   ├─ Formula::regressor_formula()  → builder → X   (no intercept with FE)
//!   ├─ Formula::fixef_formula()      → builder → FE
//!   ├─ union of non-finite rows      (Y ∪ X ∪ FE)
//!   └─ row selection + dense FE codes
//! ```
//!
//! Matrix construction goes through the [`DesignBuilder`] trait.
//! [`ColumnTable`] is a small in-memory implementation that understands
//! additive terms only.
//!
//! # Quick start
//!
//! ```
//! use hdreg_formula::{ColumnTable, Formula, decompose};
//!
//! let table = ColumnTable::new()
//!     .with_column("y", vec![1.0, 2.0, f64::NAN, 4.0]).unwrap()
//!     .with_column("x", vec![0.0, 1.0, 2.0, 3.0]).unwrap();
//!
//! let formula = Formula::parse("y ~ x").unwrap();
//! let design = decompose(&formula, &table).unwrap();
//! assert_eq!(design.n_obs(), 3);
//! assert_eq!(design.na_index(), &[2]);
//! ```

pub mod builder;
pub mod design;
pub mod error;
pub mod formula;
pub mod table;

pub use builder::{DesignBuilder, MissingPolicy, ModelMatrix};
pub use design::{DesignMatrices, decompose};
pub use error::FormulaError;
pub use formula::Formula;
pub use table::{ColumnTable, INTERCEPT};
