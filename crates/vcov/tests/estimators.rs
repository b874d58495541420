//! Properties of the covariance estimators on small and simulated designs.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use hdreg_ols::{FitResult, fit};
use hdreg_vcov::{ClusterIds, CrvType, HcType, VcovError, VcovType, vcov, vcov_all};
use ndarray::{Array1, Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

const ALL_KINDS: [VcovType; 6] = [
    VcovType::Iid,
    VcovType::Hetero(HcType::Hc1),
    VcovType::Hetero(HcType::Hc2),
    VcovType::Hetero(HcType::Hc3),
    VcovType::Cluster(CrvType::Crv1),
    VcovType::Cluster(CrvType::Crv3),
];

/// y = 1 + 0.5·x1 − x2 + e, with the error scale growing in |x1|.
fn heteroskedastic(n: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let z = Normal::<f64>::new(0.0, 1.0).unwrap();
    let x = Array2::from_shape_fn((n, 3), |(_, j)| if j == 0 { 1.0 } else { z.sample(&mut rng) });
    let y = Array2::from_shape_fn((n, 1), |(i, _)| {
        let scale = 0.2 + 2.0 * x[[i, 1]].abs();
        1.0 + 0.5 * x[[i, 1]] - x[[i, 2]] + scale * z.sample(&mut rng)
    });
    (x, y)
}

fn block_clusters(n: usize, size: usize) -> ClusterIds {
    let values: Vec<f64> = (0..n).map(|i| (i / size) as f64).collect();
    ClusterIds::from_values(&values).unwrap()
}

fn assert_symmetric(m: &Array2<f64>) {
    for i in 0..m.nrows() {
        for j in 0..i {
            assert_relative_eq!(m[[i, j]], m[[j, i]], max_relative = 1e-10, epsilon = 1e-14);
        }
    }
}

fn assert_psd(m: &Array2<f64>, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let z = Normal::<f64>::new(0.0, 1.0).unwrap();
    for d in m.diag() {
        assert!(*d >= 0.0);
    }
    for _ in 0..20 {
        let v = Array1::from_shape_fn(m.nrows(), |_| z.sample(&mut rng));
        assert!(v.dot(&m.dot(&v)) >= -1e-12);
    }
}

fn fit_one(x: &Array2<f64>, y: &Array2<f64>) -> FitResult {
    fit(x.view(), y.view(), false).unwrap()
}

/// `B (Σ_i w_i x_i x_i') B · cc` with `B = (X'X)⁻¹`, written out element by element.
fn explicit_sandwich(x: &Array2<f64>, bread: &Array2<f64>, w: &[f64], cc: f64) -> Array2<f64> {
    let k = x.ncols();
    let mut meat = Array2::<f64>::zeros((k, k));
    for (i, wi) in w.iter().enumerate() {
        for a in 0..k {
            for b in 0..k {
                meat[[a, b]] += wi * x[[i, a]] * x[[i, b]];
            }
        }
    }
    bread.dot(&meat).dot(bread).mapv(|v| v * cc)
}

fn explicit_leverage(x: &Array2<f64>, bread: &Array2<f64>) -> Vec<f64> {
    let k = x.ncols();
    (0..x.nrows())
        .map(|i| {
            let mut h = 0.0;
            for a in 0..k {
                for b in 0..k {
                    h += x[[i, a]] * bread[[a, b]] * x[[i, b]];
                }
            }
            h
        })
        .collect()
}

fn two_clusters_of_four() -> (Array2<f64>, Array2<f64>) {
    let x = array![
        [1.0, 0.5],
        [1.0, 1.5],
        [1.0, -0.3],
        [1.0, 2.2],
        [1.0, 0.9],
        [1.0, -1.1],
        [1.0, 0.1],
        [1.0, 1.7]
    ];
    let y = array![[1.0], [2.5], [0.2], [3.9], [1.1], [-0.4], [0.8], [2.0]];
    (x, y)
}

#[test]
fn every_estimator_is_symmetric_and_psd() {
    let (x, y) = heteroskedastic(120, 1);
    let res = fit_one(&x, &y);
    let ids = block_clusters(120, 10);
    for (seed, kind) in ALL_KINDS.into_iter().enumerate() {
        let v = vcov(&res, &res.regressions()[0], kind, Some(&ids)).unwrap();
        assert_eq!(v.kind(), kind);
        assert_eq!(v.matrix().dim(), (3, 3));
        assert_symmetric(v.matrix());
        assert_psd(v.matrix(), seed as u64);
    }
}

#[test]
fn repeated_calls_are_identical() {
    let (x, y) = heteroskedastic(60, 2);
    let res = fit_one(&x, &y);
    let ids = block_clusters(60, 6);
    for kind in ALL_KINDS {
        let a = vcov_all(&res, kind, Some(&ids)).unwrap();
        let b = vcov_all(&res, kind, Some(&ids)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn constant_magnitude_residuals_make_hc1_a_scaled_iid() {
    // u = [1, -1, -1, 1] is orthogonal to [1, x], so it is the OLS residual.
    let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
    let y = array![[4.0], [4.0], [6.0], [10.0]];
    let res = fit_one(&x, &y);
    let reg = &res.regressions()[0];
    for u in reg.residual().iter() {
        assert_abs_diff_eq!(u.abs(), 1.0, epsilon = 1e-10);
    }

    let iid = vcov(&res, reg, VcovType::Iid, None).unwrap();
    let hc1 = vcov(&res, reg, VcovType::Hetero(HcType::Hc1), None).unwrap();
    assert_relative_eq!(iid.correction(), 1.0);
    assert_relative_eq!(hc1.correction(), 2.0);
    for (a, b) in hc1.matrix().iter().zip(iid.matrix()) {
        assert_relative_eq!(*a, 2.0 * b, max_relative = 1e-10);
    }
    // mean(u²) = 1, so iid is (X'X)⁻¹ itself
    for (a, b) in iid.matrix().iter().zip(res.xtx_inv()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-10);
    }
}

#[test]
fn heteroskedastic_residuals_move_robust_se() {
    let (x, y) = heteroskedastic(400, 3);
    let res = fit_one(&x, &y);
    let reg = &res.regressions()[0];
    let iid = vcov(&res, reg, VcovType::Iid, None).unwrap();
    let hc1 = vcov(&res, reg, VcovType::Hetero(HcType::Hc1), None).unwrap();
    let se_iid = iid.variances()[1].sqrt();
    let se_hc1 = hc1.variances()[1].sqrt();
    assert!((se_hc1 - se_iid).abs() / se_iid > 0.1);
}

#[test]
fn hc_ordering_on_leverage() {
    let (x, y) = heteroskedastic(50, 4);
    let res = fit_one(&x, &y);
    let reg = &res.regressions()[0];
    let var = |hc| {
        vcov(&res, reg, VcovType::Hetero(hc), None)
            .unwrap()
            .variances()
    };
    let hc2 = var(HcType::Hc2);
    let hc3 = var(HcType::Hc3);
    // 1/(1-h)² ≥ 1/(1-h) for every 0 ≤ h < 1
    for (a, b) in hc2.iter().zip(&hc3) {
        assert!(b >= a);
    }
}

#[test]
fn hc_matrices_match_explicit_sandwich() {
    let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 7.0]];
    let y = array![[0.3], [1.9], [1.7], [3.6], [6.1]];
    let res = fit_one(&x, &y);
    let reg = &res.regressions()[0];
    let bread = res.xtx_inv();
    let u2: Vec<f64> = reg.residual().iter().map(|u| u * u).collect();
    let h = explicit_leverage(&x, bread);
    assert!(h.iter().all(|&hi| hi > 0.0 && hi < 1.0));

    let cases = [
        (HcType::Hc1, 0, 5.0 / 3.0),
        (HcType::Hc2, 1, 1.0),
        (HcType::Hc3, 2, 1.0),
    ];
    for (hc, power, cc) in cases {
        let w: Vec<f64> = u2
            .iter()
            .zip(&h)
            .map(|(ui, hi)| ui / (1.0 - hi).powi(power))
            .collect();
        let expected = explicit_sandwich(&x, bread, &w, cc);
        let v = vcov(&res, reg, VcovType::Hetero(hc), None).unwrap();
        assert_relative_eq!(v.correction(), cc, max_relative = 1e-12);
        for (a, b) in v.matrix().iter().zip(&expected) {
            assert_relative_eq!(*a, *b, max_relative = 1e-10, epsilon = 1e-14);
        }
    }
}

#[test]
fn crv1_matches_explicit_score_sum() {
    let (x, y) = two_clusters_of_four();
    let res = fit_one(&x, &y);
    let reg = &res.regressions()[0];
    let u = reg.residual();
    let ids = block_clusters(8, 4);

    let mut meat = Array2::<f64>::zeros((2, 2));
    for g in 0..2 {
        let mut score = [0.0; 2];
        for i in (4 * g)..(4 * g + 4) {
            score[0] += x[[i, 0]] * u[i];
            score[1] += x[[i, 1]] * u[i];
        }
        for a in 0..2 {
            for b in 0..2 {
                meat[[a, b]] += score[a] * score[b];
            }
        }
    }
    let cc = 2.0 * 7.0 / 6.0;
    let bread = res.xtx_inv();
    let expected = bread.dot(&meat).dot(bread).mapv(|v| v * cc);

    let crv1 = vcov(&res, reg, VcovType::Cluster(CrvType::Crv1), Some(&ids)).unwrap();
    for (a, b) in crv1.matrix().iter().zip(&expected) {
        assert_relative_eq!(*a, *b, max_relative = 1e-10, epsilon = 1e-14);
    }
}

#[test]
fn two_clusters_of_four_correction() {
    let (x, y) = two_clusters_of_four();
    let res = fit_one(&x, &y);
    let ids = block_clusters(8, 4);
    assert_eq!(ids.n_groups(), 2);

    let crv1 = vcov(&res, &res.regressions()[0], VcovType::Cluster(CrvType::Crv1), Some(&ids))
        .unwrap();
    assert_relative_eq!(crv1.correction(), 2.0 * 7.0 / 6.0, max_relative = 1e-12);

    let crv3 = vcov(&res, &res.regressions()[0], VcovType::Cluster(CrvType::Crv3), Some(&ids))
        .unwrap();
    assert_relative_eq!(crv3.correction(), 0.5, max_relative = 1e-12);
}

#[test]
fn crv3_with_fixed_effects_is_rejected_first() {
    let x = array![[0.5], [-0.5], [1.0], [-1.0]];
    let y = array![[1.0], [-1.0], [0.5], [-0.7]];
    let res = fit(x.view(), y.view(), true).unwrap();
    // Checked before the missing cluster ids.
    let err = vcov_all(&res, VcovType::Cluster(CrvType::Crv3), None).unwrap_err();
    assert!(matches!(err, VcovError::Crv3WithFixedEffects));

    // CRV1 is fine with fixed effects.
    let ids = block_clusters(4, 2);
    assert!(vcov_all(&res, VcovType::Cluster(CrvType::Crv1), Some(&ids)).is_ok());
}

#[test]
fn cluster_length_mismatch() {
    let (x, y) = heteroskedastic(20, 5);
    let res = fit_one(&x, &y);
    let ids = block_clusters(19, 5);
    let err = vcov_all(&res, VcovType::Cluster(CrvType::Crv1), Some(&ids)).unwrap_err();
    assert!(matches!(
        err,
        VcovError::ClusterLengthMismatch {
            clusters: 19,
            n_obs: 20
        }
    ));
}

#[test]
fn singleton_clusters_reproduce_hc1() {
    let (x, y) = heteroskedastic(40, 6);
    let res = fit_one(&x, &y);
    let ids = block_clusters(40, 1);
    let crv1 = vcov_all(&res, VcovType::Cluster(CrvType::Crv1), Some(&ids)).unwrap();
    let hc1 = vcov_all(&res, VcovType::Hetero(HcType::Hc1), None).unwrap();
    assert_relative_eq!(crv1[0].correction(), hc1[0].correction(), max_relative = 1e-12);
    for (a, b) in crv1[0].matrix().iter().zip(hc1[0].matrix()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-9, epsilon = 1e-14);
    }
}

#[test]
fn crv3_matches_explicit_leave_one_cluster_out() {
    let (x, y) = heteroskedastic(48, 7);
    let res = fit_one(&x, &y);
    let ids = block_clusters(48, 12);
    let beta_hat = res.regressions()[0].beta_hat();

    let mut expected = Array2::<f64>::zeros((3, 3));
    for rows in ids.members() {
        let keep: Vec<usize> = (0..48).filter(|i| !rows.contains(i)).collect();
        let x_k = x.select(ndarray::Axis(0), &keep);
        let y_k = y.select(ndarray::Axis(0), &keep);
        let sub = fit_one(&x_k, &y_k);
        let d = sub.regressions()[0].beta_hat() - beta_hat;
        for i in 0..3 {
            for j in 0..3 {
                expected[[i, j]] += d[i] * d[j];
            }
        }
    }
    expected.mapv_inplace(|v| v * 3.0 / 4.0);

    let crv3 = vcov(&res, &res.regressions()[0], VcovType::Cluster(CrvType::Crv3), Some(&ids))
        .unwrap();
    for (a, b) in crv3.matrix().iter().zip(&expected) {
        assert_relative_eq!(*a, *b, max_relative = 1e-8, epsilon = 1e-14);
    }
}

#[test]
fn one_vcov_per_regression() {
    let (x, y1) = heteroskedastic(30, 8);
    let mut y = Array2::zeros((30, 2));
    y.column_mut(0).assign(&y1.column(0));
    y.column_mut(1).assign(&y1.column(0).mapv(|v| 3.0 * v - 1.0));
    let res = fit_one(&x, &y);
    let all = vcov_all(&res, VcovType::Hetero(HcType::Hc3), None).unwrap();
    assert_eq!(all.len(), 2);
    // Scaling y by 3 scales residuals by 3 and the covariance by 9.
    for (a, b) in all[1].matrix().iter().zip(all[0].matrix()) {
        assert_relative_eq!(*a, 9.0 * b, max_relative = 1e-9);
    }
}
