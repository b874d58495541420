//! Statistical helper functions shared by the hdreg crates.

use std::collections::HashMap;

use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sum of squared values, `Σ xᵢ²`.
pub fn sum_of_squares(data: &[f64]) -> f64 {
    data.iter().map(|&x| x * x).sum()
}

/// Total sum of squares around the mean, `Σ (xᵢ − x̄)²`.
/// Returns 0.0 if empty.
pub fn total_sum_of_squares(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum()
}

/// Standard normal cumulative distribution function Φ(x).
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal quantile Φ⁻¹(p).
///
/// Returns NaN for `p` outside `[0, 1]`; the endpoints map to ∓∞.
pub fn normal_quantile(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    Normal::standard().inverse_cdf(p)
}

/// Two-sided p-value of a z-statistic under the standard normal,
/// `2 · (1 − Φ(|z|))`.
pub fn two_sided_normal_pvalue(z: f64) -> f64 {
    2.0 * (1.0 - normal_cdf(z.abs()))
}

/// Dense integer codes for a column of group labels.
///
/// Codes are assigned in order of first appearance, starting at 0.
/// Returns the codes and the number of distinct groups. Labels are compared
/// by value, with `-0.0` and `0.0` treated as the same group. Non-finite
/// labels are the caller's responsibility to filter out beforehand.
pub fn factorize(labels: &[f64]) -> (Vec<usize>, usize) {
    let mut seen: HashMap<u64, usize> = HashMap::new();
    let mut codes = Vec::with_capacity(labels.len());
    for &label in labels {
        // `+ 0.0` folds negative zero into positive zero
        let key = (label + 0.0).to_bits();
        let next = seen.len();
        let code = *seen.entry(key).or_insert(next);
        codes.push(code);
    }
    (codes, seen.len())
}
