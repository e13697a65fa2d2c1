//! Kolmogorov distribution and the binned two-sample KS test.

/// Survival function of the Kolmogorov distribution, `P(D > z)`.
///
/// Closed-form three-term series below the crossover, four-term alternating
/// series above it; exact limits at both ends.
pub fn kolmogorov_prob(z: f64) -> f64 {
    const W: f64 = 2.506_628_274_631_000_5; // sqrt(2*pi)
    const C1: f64 = -1.233_700_550_136_169_7; // -pi^2/8
    const C2: f64 = -11.103_304_951_225_528; // 9*C1
    const C3: f64 = -30.842_513_753_404_244; // 25*C1

    let u = z.abs();
    if u < 0.2 {
        return 1.0;
    }
    if u < 0.755 {
        let v = 1.0 / (u * u);
        return 1.0 - W * ((C1 * v).exp() + (C2 * v).exp() + (C3 * v).exp()) / u;
    }
    if u < 6.8116 {
        let coef = [-2.0, -8.0, -18.0, -32.0];
        let v = u * u;
        let terms = ((3.0 / u).round() as usize).clamp(1, 4);
        let mut r = [0.0f64; 4];
        for (j, c) in coef.iter().enumerate().take(terms) {
            r[j] = (c * v).exp();
        }
        return 2.0 * (r[0] - r[1] + r[2] - r[3]);
    }
    0.0
}

/// Two-sample KS summary.
#[derive(Debug, Clone, Copy)]
pub struct KsSummary {
    /// Probability that the two samples draw from the same distribution.
    pub prob: f64,
    /// Maximum distance between the normalized cumulative distributions.
    pub dmax: f64,
    /// Scaled test statistic fed to the Kolmogorov distribution.
    pub z: f64,
}

/// Binned two-sample Kolmogorov-Smirnov test.
///
/// `error_a`/`error_b` are per-bin uncertainties; the effective entry count
/// per side is `(sum of contents)^2 / (sum of squared errors)`. Returns
/// `None` when the shapes differ, either content sum is zero or not finite,
/// or either side has no error information.
pub fn ks_binned(
    content_a: &[f64],
    error_a: &[f64],
    content_b: &[f64],
    error_b: &[f64],
) -> Option<KsSummary> {
    if content_a.len() != content_b.len()
        || content_a.len() != error_a.len()
        || content_b.len() != error_b.len()
        || content_a.is_empty()
    {
        return None;
    }

    let sum_a: f64 = content_a.iter().sum();
    let sum_b: f64 = content_b.iter().sum();
    if sum_a == 0.0 || sum_b == 0.0 || !sum_a.is_finite() || !sum_b.is_finite() {
        return None;
    }
    let ew_a: f64 = error_a.iter().map(|e| e * e).sum();
    let ew_b: f64 = error_b.iter().map(|e| e * e).sum();
    if ew_a <= 0.0 || ew_b <= 0.0 {
        return None;
    }

    let mut rsum_a = 0.0;
    let mut rsum_b = 0.0;
    let mut dmax: f64 = 0.0;
    for i in 0..content_a.len() {
        rsum_a += content_a[i] / sum_a;
        rsum_b += content_b[i] / sum_b;
        dmax = dmax.max((rsum_a - rsum_b).abs());
    }

    // Effective number of entries per side.
    let n_eff_a = sum_a * sum_a / ew_a;
    let n_eff_b = sum_b * sum_b / ew_b;
    let z = dmax * (n_eff_a * n_eff_b / (n_eff_a + n_eff_b)).sqrt();

    Some(KsSummary { prob: kolmogorov_prob(z), dmax, z })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_prob_limits() {
        assert_eq!(kolmogorov_prob(0.0), 1.0);
        assert_eq!(kolmogorov_prob(0.1), 1.0);
        assert_eq!(kolmogorov_prob(10.0), 0.0);
    }

    #[test]
    fn test_prob_monotone_decreasing() {
        let zs = [0.3, 0.5, 0.7, 0.9, 1.2, 1.6, 2.0, 3.0, 5.0];
        let mut prev = 1.0;
        for z in zs {
            let p = kolmogorov_prob(z);
            assert!((0.0..=1.0).contains(&p), "prob({}) = {}", z, p);
            assert!(p <= prev + 1e-12, "not monotone at z={}", z);
            prev = p;
        }
    }

    #[test]
    fn test_prob_known_value() {
        // P(D > 1) for the Kolmogorov distribution.
        let p = kolmogorov_prob(1.0);
        assert_relative_eq!(p, 0.269_999_67, epsilon = 1e-6);
    }

    #[test]
    fn test_ks_identical_samples() {
        let c: [f64; 4] = [4.0, 9.0, 25.0, 16.0];
        let e: Vec<f64> = c.iter().map(|x| x.sqrt()).collect();
        let s = ks_binned(&c, &e, &c, &e).expect("computable");
        assert_eq!(s.dmax, 0.0);
        assert_eq!(s.prob, 1.0);
    }

    #[test]
    fn test_ks_disjoint_samples() {
        let c1: [f64; 4] = [100.0, 100.0, 0.0, 0.0];
        let c2: [f64; 4] = [0.0, 0.0, 100.0, 100.0];
        let e1: Vec<f64> = c1.iter().map(|x| x.sqrt()).collect();
        let e2: Vec<f64> = c2.iter().map(|x| x.sqrt()).collect();
        let s = ks_binned(&c1, &e1, &c2, &e2).expect("computable");
        assert!((s.dmax - 1.0).abs() < 1e-12);
        assert!(s.prob < 1e-6, "prob = {}", s.prob);
    }

    #[test]
    fn test_ks_empty_or_mismatched() {
        let c = [1.0, 2.0];
        let e = [1.0, 1.0];
        assert!(ks_binned(&c, &e, &[0.0, 0.0], &[0.0, 0.0]).is_none());
        assert!(ks_binned(&c, &e, &[1.0], &[1.0]).is_none());
        assert!(ks_binned(&[], &[], &[], &[]).is_none());
    }
}
