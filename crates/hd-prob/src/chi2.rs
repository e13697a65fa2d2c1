//! Two-sample chi-square test for binned distributions.
//!
//! Bin-by-bin comparison of two same-shape binned samples under three
//! weighting regimes: both samples unweighted (raw counts), first unweighted
//! and second weighted (per-bin variances), or both weighted. Bins where
//! both contents are exactly zero are excluded from the sum and from the
//! degrees of freedom. Every precondition failure degrades to
//! [`Chi2Outcome::NotApplicable`]; the engine never errors.

use statrs::function::gamma::gamma_ur;

/// Weighting regime of the two input samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chi2Regime {
    /// Both samples hold raw counts; Poisson variance is implied.
    UnweightedUnweighted,
    /// First sample unweighted, second sample carries per-bin variances.
    UnweightedWeighted,
    /// Both samples carry per-bin variances.
    WeightedWeighted,
}

/// Options controlling one engine invocation.
#[derive(Debug, Clone, Copy)]
pub struct Chi2Options {
    /// Weighting regime to apply.
    pub regime: Chi2Regime,
    /// Include the underflow bin pair when both samples carry one.
    pub include_underflow: bool,
    /// Include the overflow bin pair when both samples carry one.
    pub include_overflow: bool,
    /// Weighted-weighted only: compare contents normalized by the total
    /// sums (for samples with different overall scale).
    pub normalized: bool,
}

impl Default for Chi2Options {
    fn default() -> Self {
        Chi2Options {
            regime: Chi2Regime::UnweightedUnweighted,
            include_underflow: false,
            include_overflow: false,
            normalized: false,
        }
    }
}

/// Binned view of one sample as the engine consumes it.
///
/// `content` and `variance` are parallel arrays over the non-flow bins
/// (row-major for 2-D), `dims` holds the bin count per axis. Flow bins are
/// collapsed to one (content, variance) pair per side.
#[derive(Debug, Clone, Copy)]
pub struct BinnedInput<'a> {
    /// Bin counts per axis.
    pub dims: &'a [usize],
    /// Bin contents.
    pub content: &'a [f64],
    /// Per-bin variances (for unweighted samples: equal to the contents).
    pub variance: &'a [f64],
    /// Underflow (content, variance), if tracked.
    pub underflow: Option<(f64, f64)>,
    /// Overflow (content, variance), if tracked.
    pub overflow: Option<(f64, f64)>,
}

/// Computed test summary.
#[derive(Debug, Clone, Copy)]
pub struct Chi2Summary {
    /// Upper-tail probability `Q(ndf/2, chi2/2)`; NaN when `ndf <= 0`.
    pub prob: f64,
    /// Chi-square statistic.
    pub chi2: f64,
    /// Degrees of freedom (included bins minus one, minus both-zero bins).
    pub ndf: i64,
    /// Bin-quality flag: bit 0 set when the first sample has low-statistics
    /// bins, bit 1 for the second. Non-zero disqualifies the probability.
    pub igood: u8,
}

/// Outcome of one engine invocation.
#[derive(Debug, Clone)]
pub enum Chi2Outcome {
    /// The statistic was computed.
    Computed(Chi2Summary),
    /// The pair does not admit the test; the string says why.
    NotApplicable(String),
}

impl Chi2Outcome {
    /// Computed summary, if any.
    pub fn summary(&self) -> Option<&Chi2Summary> {
        match self {
            Chi2Outcome::Computed(s) => Some(s),
            Chi2Outcome::NotApplicable(_) => None,
        }
    }
}

/// Iteration bound for the degenerate-root nudge loop in the
/// unweighted-weighted branch. Exhaustion reports the pair not applicable.
const MAX_NUDGE_ITERATIONS: usize = 1000;

/// Run the two-sample chi-square test.
pub fn chi2_test(a: &BinnedInput<'_>, b: &BinnedInput<'_>, opts: &Chi2Options) -> Chi2Outcome {
    if a.dims != b.dims {
        return Chi2Outcome::NotApplicable(format!(
            "shape mismatch: {:?} vs {:?}",
            a.dims, b.dims
        ));
    }
    if a.content.len() != a.variance.len()
        || b.content.len() != b.variance.len()
        || a.content.len() != b.content.len()
    {
        return Chi2Outcome::NotApplicable("content/variance arrays are not parallel".into());
    }

    // Included bin pairs: (c1, v1, c2, v2).
    let mut bins: Vec<(f64, f64, f64, f64)> =
        Vec::with_capacity(a.content.len() + 2);
    if opts.include_underflow {
        if let (Some((c1, v1)), Some((c2, v2))) = (a.underflow, b.underflow) {
            bins.push((c1, v1, c2, v2));
        }
    }
    for i in 0..a.content.len() {
        bins.push((a.content[i], a.variance[i], b.content[i], b.variance[i]));
    }
    if opts.include_overflow {
        if let (Some((c1, v1)), Some((c2, v2))) = (a.overflow, b.overflow) {
            bins.push((c1, v1, c2, v2));
        }
    }

    let mut ndf: i64 = bins.len() as i64 - 1;

    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    let mut sumw1 = 0.0;
    let mut sumw2 = 0.0;
    for &(c1, v1, c2, v2) in &bins {
        sum1 += c1;
        sum2 += c2;
        sumw1 += v1;
        sumw2 += v2;
    }
    if sum1 == 0.0 || sum2 == 0.0 {
        return Chi2Outcome::NotApplicable("total content of one sample is zero".into());
    }

    let mut chi2 = 0.0;
    // Low-statistics bin counters for the quality flag.
    let mut m = 0usize;
    let mut n = 0usize;

    match opts.regime {
        Chi2Regime::UnweightedUnweighted => {
            for &(c1, _, c2, _) in &bins {
                if c1 == 0.0 && c2 == 0.0 {
                    ndf -= 1;
                    continue;
                }
                if c1 < 1.0 {
                    m += 1;
                }
                if c2 < 1.0 {
                    n += 1;
                }
                let pair = c1 + c2;
                let e1 = sum1 * pair / (sum1 + sum2);
                let e2 = sum2 * pair / (sum1 + sum2);
                if e1 > 0.0 {
                    chi2 += (c1 - e1) * (c1 - e1) / e1;
                }
                if e2 > 0.0 {
                    chi2 += (c2 - e2) * (c2 - e2) / e2;
                }
            }
        }
        Chi2Regime::UnweightedWeighted => {
            // The nudge below shifts sum1 for all later bins, not just the
            // current one.
            let mut sum1 = sum1;
            for &(c1, _, c2, v2) in &bins {
                if c1 == 0.0 && c2 == 0.0 {
                    ndf -= 1;
                    continue;
                }
                let mut c1 = c1;
                let mut e2sq = v2;
                if c2 == 0.0 && e2sq == 0.0 {
                    if sumw2 > 0.0 {
                        e2sq = sumw2 / sum2;
                    } else {
                        return Chi2Outcome::NotApplicable(
                            "weighted sample has no variance information for empty bins".into(),
                        );
                    }
                }

                // Closed-form expected count from the quadratic in the
                // shared bin probability; a bounded nudge steps away from
                // the degenerate root.
                let mut var1 = sum2 * c2 - sum1 * e2sq;
                let mut var2 = var1 * var1 + 4.0 * sum2 * sum2 * c1 * e2sq;
                let mut iterations = 0usize;
                while var1 * var1 + c1 == 0.0 || var1 + var2.sqrt() == 0.0 {
                    if iterations >= MAX_NUDGE_ITERATIONS {
                        log::warn!("chi2: degenerate expected-count root did not stabilize");
                        return Chi2Outcome::NotApplicable(
                            "degenerate expected-count root did not stabilize".into(),
                        );
                    }
                    iterations += 1;
                    sum1 += 1.0;
                    c1 += 1.0;
                    var1 = sum2 * c2 - sum1 * e2sq;
                    var2 = var1 * var1 + 4.0 * sum2 * sum2 * c1 * e2sq;
                }

                let prob_b = (var1 + var2.sqrt()) / (2.0 * sum2 * sum2);
                let nexp1 = prob_b * sum1;
                let nexp2 = prob_b * sum2;
                let d1 = c1 - nexp1;
                let d2 = c2 - nexp2;
                chi2 += d1 * d1 / nexp1;
                if e2sq > 0.0 {
                    chi2 += d2 * d2 / e2sq;
                }

                if c1 < 1.0 {
                    m += 1;
                }
                if e2sq > 0.0 && c2 * c2 / e2sq < 10.0 {
                    n += 1;
                }
            }
        }
        Chi2Regime::WeightedWeighted => {
            for &(c1, v1, c2, v2) in &bins {
                if c1 == 0.0 && c2 == 0.0 {
                    ndf -= 1;
                    continue;
                }
                let mut e1sq = v1;
                let mut e2sq = v2;
                if c1 == 0.0 && e1sq == 0.0 {
                    if sumw1 > 0.0 {
                        e1sq = sumw1 / sum1;
                    } else {
                        return Chi2Outcome::NotApplicable(
                            "first sample has no variance information for empty bins".into(),
                        );
                    }
                }
                if c2 == 0.0 && e2sq == 0.0 {
                    if sumw2 > 0.0 {
                        e2sq = sumw2 / sum2;
                    } else {
                        return Chi2Outcome::NotApplicable(
                            "second sample has no variance information for empty bins".into(),
                        );
                    }
                }

                if opts.normalized {
                    // Compare c/sum with variance-of-ratio propagation.
                    let delta = c1 / sum1 - c2 / sum2;
                    let sigma = e1sq / (sum1 * sum1) + e2sq / (sum2 * sum2);
                    if sigma > 0.0 {
                        chi2 += delta * delta / sigma;
                    }
                } else {
                    let delta = c1 - c2;
                    let sigma = e1sq + e2sq;
                    if sigma > 0.0 {
                        chi2 += delta * delta / sigma;
                    }
                }

                if e1sq > 0.0 && c1 * c1 / e1sq < 10.0 {
                    m += 1;
                }
                if e2sq > 0.0 && c2 * c2 / e2sq < 10.0 {
                    n += 1;
                }
            }
        }
    }

    let igood = u8::from(m > 0) + 2 * u8::from(n > 0);
    let prob = if ndf > 0 && chi2.is_finite() && chi2 >= 0.0 {
        gamma_ur(0.5 * ndf as f64, 0.5 * chi2)
    } else {
        f64::NAN
    };

    Chi2Outcome::Computed(Chi2Summary { prob, chi2, ndf, igood })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unweighted(content: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (content.to_vec(), content.to_vec())
    }

    fn input<'a>(dims: &'a [usize], content: &'a [f64], variance: &'a [f64]) -> BinnedInput<'a> {
        BinnedInput { dims, content, variance, underflow: None, overflow: None }
    }

    #[test]
    fn test_identical_samples_prob_one() {
        let (c, v) = unweighted(&[4.0, 9.0, 25.0, 16.0, 8.0]);
        let dims = [5usize];
        let out = chi2_test(&input(&dims, &c, &v), &input(&dims, &c, &v), &Chi2Options::default());
        let s = out.summary().expect("computed");
        assert_eq!(s.ndf, 4);
        assert_eq!(s.igood, 0);
        assert!(s.chi2.abs() < 1e-12);
        assert_relative_eq!(s.prob, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch_not_applicable() {
        let (c1, v1) = unweighted(&[1.0, 2.0, 3.0]);
        let (c2, v2) = unweighted(&[1.0, 2.0]);
        let d1 = [3usize];
        let d2 = [2usize];
        let out = chi2_test(&input(&d1, &c1, &v1), &input(&d2, &c2, &v2), &Chi2Options::default());
        assert!(out.summary().is_none());
    }

    #[test]
    fn test_empty_sample_not_applicable() {
        let (c1, v1) = unweighted(&[1.0, 2.0, 3.0]);
        let (c2, v2) = unweighted(&[0.0, 0.0, 0.0]);
        let dims = [3usize];
        let out = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &Chi2Options::default());
        assert!(matches!(out, Chi2Outcome::NotApplicable(_)));
    }

    #[test]
    fn test_both_zero_bins_reduce_ndf() {
        let (c1, v1) = unweighted(&[5.0, 0.0, 7.0, 3.0]);
        let (c2, v2) = unweighted(&[5.0, 0.0, 7.0, 3.0]);
        let dims = [4usize];
        let out = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &Chi2Options::default());
        let s = out.summary().expect("computed");
        // 4 bins - 1, minus the shared empty bin.
        assert_eq!(s.ndf, 2);
    }

    #[test]
    fn test_low_statistics_bins_set_igood() {
        let (c1, v1) = unweighted(&[0.5, 9.0, 25.0]);
        let (c2, v2) = unweighted(&[4.0, 9.0, 0.2]);
        let dims = [3usize];
        let out = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &Chi2Options::default());
        let s = out.summary().expect("computed");
        assert_eq!(s.igood, 3);
    }

    #[test]
    fn test_flow_bins_extend_range() {
        let (c, v) = unweighted(&[4.0, 9.0, 25.0]);
        let dims = [3usize];
        let mut a = input(&dims, &c, &v);
        let mut b = input(&dims, &c, &v);
        a.underflow = Some((2.0, 2.0));
        b.underflow = Some((2.0, 2.0));
        a.overflow = Some((1.0, 1.0));
        b.overflow = Some((1.0, 1.0));
        let opts = Chi2Options {
            include_underflow: true,
            include_overflow: true,
            ..Chi2Options::default()
        };
        let s = chi2_test(&a, &b, &opts).summary().copied().expect("computed");
        assert_eq!(s.ndf, 4);
        assert_relative_eq!(s.prob, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_very_different_samples_low_prob() {
        let (c1, v1) = unweighted(&[50.0, 40.0, 10.0, 4.0, 2.0]);
        let (c2, v2) = unweighted(&[2.0, 4.0, 10.0, 40.0, 50.0]);
        let dims = [5usize];
        let out = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &Chi2Options::default());
        let s = out.summary().expect("computed");
        assert!(s.chi2 > 50.0, "chi2 = {}", s.chi2);
        assert!(s.prob < 1e-6, "prob = {}", s.prob);
    }

    #[test]
    fn test_uw_identical_shapes_high_prob() {
        // Unweighted counts vs a weighted sample with the same contents and
        // Poisson-like variances.
        let c1 = vec![20.0, 35.0, 30.0, 15.0];
        let v1 = c1.clone();
        let c2 = c1.clone();
        let v2 = c1.clone();
        let dims = [4usize];
        let opts = Chi2Options { regime: Chi2Regime::UnweightedWeighted, ..Chi2Options::default() };
        let s = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &opts)
            .summary()
            .copied()
            .expect("computed");
        assert_eq!(s.ndf, 3);
        assert!(s.chi2 < 1e-9, "chi2 = {}", s.chi2);
        assert!(s.prob > 0.999, "prob = {}", s.prob);
    }

    #[test]
    fn test_ww_identical_prob_one() {
        let c = vec![12.5, 30.25, 18.0];
        let v = vec![6.0, 14.5, 9.25];
        let dims = [3usize];
        let opts = Chi2Options { regime: Chi2Regime::WeightedWeighted, ..Chi2Options::default() };
        let s = chi2_test(&input(&dims, &c, &v), &input(&dims, &c, &v), &opts)
            .summary()
            .copied()
            .expect("computed");
        assert!(s.chi2.abs() < 1e-12);
        assert_relative_eq!(s.prob, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ww_normalized_scale_invariant() {
        // Second sample is the first scaled by 10; the normalized sub-mode
        // should see no shape difference.
        let c1 = vec![12.0, 30.0, 18.0];
        let v1 = vec![12.0, 30.0, 18.0];
        let c2: Vec<f64> = c1.iter().map(|x| x * 10.0).collect();
        let v2: Vec<f64> = v1.iter().map(|x| x * 100.0).collect();
        let dims = [3usize];
        let opts = Chi2Options {
            regime: Chi2Regime::WeightedWeighted,
            normalized: true,
            ..Chi2Options::default()
        };
        let s = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &opts)
            .summary()
            .copied()
            .expect("computed");
        assert!(s.chi2.abs() < 1e-9, "chi2 = {}", s.chi2);
    }

    #[test]
    fn test_ww_empty_bin_variance_substitution() {
        // One empty bin with zero variance on the second side; the engine
        // substitutes the average variance instead of giving up.
        let c1 = vec![10.0, 5.0, 4.0];
        let v1 = vec![10.0, 5.0, 4.0];
        let c2 = vec![10.0, 5.0, 0.0];
        let v2 = vec![9.0, 6.0, 0.0];
        let dims = [3usize];
        let opts = Chi2Options { regime: Chi2Regime::WeightedWeighted, ..Chi2Options::default() };
        let out = chi2_test(&input(&dims, &c1, &v1), &input(&dims, &c2, &v2), &opts);
        let s = out.summary().expect("computed");
        assert!(s.chi2.is_finite());
        assert!(s.chi2 > 0.0);
    }

    #[test]
    fn test_single_bin_has_no_probability() {
        let (c, v) = unweighted(&[5.0]);
        let dims = [1usize];
        let s = chi2_test(&input(&dims, &c, &v), &input(&dims, &c, &v), &Chi2Options::default())
            .summary()
            .copied()
            .expect("computed");
        assert_eq!(s.ndf, 0);
        assert!(s.prob.is_nan());
    }
}
