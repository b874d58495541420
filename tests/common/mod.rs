//! Shared fixtures for the pipeline tests.

#![allow(dead_code)]

use hdreg::{ColumnTable, DemeanError, FixedEffectSolver};
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Alternating projections: sweep group-mean subtraction over every fixed
/// effect until the largest update falls below `tol`.
pub struct AlternatingProjections {
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for AlternatingProjections {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            max_iter: 10_000,
        }
    }
}

impl FixedEffectSolver for AlternatingProjections {
    fn demean(
        &self,
        groups: ArrayView2<'_, usize>,
        values: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, DemeanError> {
        let mut out = values.to_owned();
        for mut col in out.columns_mut() {
            let mut converged = false;
            for _ in 0..self.max_iter {
                let mut max_step: f64 = 0.0;
                for fe in groups.columns() {
                    let n_groups = fe.iter().max().map_or(0, |&m| m + 1);
                    let mut sums = vec![0.0; n_groups];
                    let mut counts = vec![0.0; n_groups];
                    for (&g, &v) in fe.iter().zip(col.iter()) {
                        sums[g] += v;
                        counts[g] += 1.0;
                    }
                    for (&g, v) in fe.iter().zip(col.iter_mut()) {
                        let step = sums[g] / counts[g];
                        max_step = max_step.max(step.abs());
                        *v -= step;
                    }
                }
                if max_step < self.tol {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(DemeanError::NotConverged {
                    iterations: self.max_iter,
                });
            }
        }
        Ok(out)
    }
}

/// Panel with `n_firms × n_years` rows:
/// `y = 1.5·x1 − 0.8·x2 + firm effect + year effect + e`, with a cluster
/// column `firm` and a second outcome `y2 = 2·y`.
pub fn panel(n_firms: usize, n_years: usize, seed: u64) -> ColumnTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let z = Normal::<f64>::new(0.0, 1.0).unwrap();
    let firm_effects: Vec<f64> = (0..n_firms).map(|_| 3.0 * z.sample(&mut rng)).collect();
    let year_effects: Vec<f64> = (0..n_years).map(|_| z.sample(&mut rng)).collect();

    let n = n_firms * n_years;
    let mut y = Vec::with_capacity(n);
    let mut x1 = Vec::with_capacity(n);
    let mut x2 = Vec::with_capacity(n);
    let mut firm = Vec::with_capacity(n);
    let mut year = Vec::with_capacity(n);
    for f in 0..n_firms {
        for t in 0..n_years {
            let a = z.sample(&mut rng) + 0.5 * firm_effects[f];
            let b = z.sample(&mut rng);
            let e = 0.5 * z.sample(&mut rng);
            y.push(1.5 * a - 0.8 * b + firm_effects[f] + year_effects[t] + e);
            x1.push(a);
            x2.push(b);
            firm.push(100.0 + f as f64);
            year.push(2000.0 + t as f64);
        }
    }
    let y2 = y.iter().map(|v| 2.0 * v).collect();

    ColumnTable::new()
        .with_column("y", y)
        .unwrap()
        .with_column("y2", y2)
        .unwrap()
        .with_column("x1", x1)
        .unwrap()
        .with_column("x2", x2)
        .unwrap()
        .with_column("firm", firm)
        .unwrap()
        .with_column("year", year)
        .unwrap()
}

/// Adds 0/1 indicator columns `{prefix}{level}` for every level of
/// `column` except the first.
pub fn with_dummies(mut table: ColumnTable, column: &str, prefix: &str) -> ColumnTable {
    let values = table.column(column).unwrap().to_vec();
    let mut levels: Vec<f64> = Vec::new();
    for &v in &values {
        if !levels.contains(&v) {
            levels.push(v);
        }
    }
    for (j, level) in levels.iter().enumerate().skip(1) {
        let dummy = values.iter().map(|&v| if v == *level { 1.0 } else { 0.0 }).collect();
        table.insert(format!("{prefix}{j}"), dummy).unwrap();
    }
    table
}
