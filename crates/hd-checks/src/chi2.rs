//! Two-sample chi-square compatibility check.

use std::sync::Arc;

use hd_core::{Error, Memo, Result};
use hd_prob::{chi2_test, BinnedInput, Chi2Options, Chi2Outcome, Chi2Regime};
use hd_sample::Sample;

use crate::framework::{CompatCheck, ThresholdDecision, ThresholdOp};

/// Wraps the `hd-prob` chi-square engine; the score is the upper-tail
/// probability, so higher means more compatible. The weighting regime is
/// selected from the samples' `weighted` flags; when only the first sample
/// is weighted the pair is evaluated with the roles swapped (the engine
/// expects the unweighted side first). Engine-level degradations and any
/// non-zero bin-quality flag make the check inapplicable rather than
/// producing a misleading probability.
pub struct Chi2Check {
    a: Arc<Sample>,
    b: Arc<Sample>,
    options: Chi2Options,
    decision: ThresholdDecision,
    disabled: bool,
    result: Memo<Chi2Outcome>,
    applicable: Memo<bool>,
    valid: Memo<bool>,
}

impl Chi2Check {
    /// Conventional p-value floor.
    pub const DEFAULT_THRESHOLD: f64 = 0.01;

    /// Bind a sample pair with default engine options.
    pub fn new(a: Arc<Sample>, b: Arc<Sample>, threshold: f64, disabled: bool) -> Self {
        Chi2Check {
            a,
            b,
            options: Chi2Options::default(),
            decision: ThresholdDecision { threshold, op: ThresholdOp::Greater },
            disabled,
            result: Memo::new(),
            applicable: Memo::new(),
            valid: Memo::new(),
        }
    }

    /// Bind a sample pair with explicit flow/normalization options. The
    /// regime field is still overridden from the samples' weighted flags.
    pub fn with_options(
        a: Arc<Sample>,
        b: Arc<Sample>,
        threshold: f64,
        disabled: bool,
        options: Chi2Options,
    ) -> Self {
        Chi2Check { options, ..Chi2Check::new(a, b, threshold, disabled) }
    }

    fn outcome(&self) -> &Chi2Outcome {
        self.result.get_or_init(|| {
            let var_a = self.a.variances();
            let var_b = self.b.variances();
            let input_a = BinnedInput {
                dims: &self.a.dims,
                content: &self.a.content,
                variance: &var_a,
                underflow: self.a.underflow,
                overflow: self.a.overflow,
            };
            let input_b = BinnedInput {
                dims: &self.b.dims,
                content: &self.b.content,
                variance: &var_b,
                underflow: self.b.underflow,
                overflow: self.b.overflow,
            };
            match (self.a.weighted, self.b.weighted) {
                (false, false) => {
                    let opts =
                        Chi2Options { regime: Chi2Regime::UnweightedUnweighted, ..self.options };
                    chi2_test(&input_a, &input_b, &opts)
                }
                (false, true) => {
                    let opts =
                        Chi2Options { regime: Chi2Regime::UnweightedWeighted, ..self.options };
                    chi2_test(&input_a, &input_b, &opts)
                }
                (true, false) => {
                    let opts =
                        Chi2Options { regime: Chi2Regime::UnweightedWeighted, ..self.options };
                    chi2_test(&input_b, &input_a, &opts)
                }
                (true, true) => {
                    let opts =
                        Chi2Options { regime: Chi2Regime::WeightedWeighted, ..self.options };
                    chi2_test(&input_a, &input_b, &opts)
                }
            }
        })
    }

    fn prob(&self) -> f64 {
        self.outcome().summary().map_or(f64::NAN, |s| s.prob)
    }
}

impl CompatCheck for Chi2Check {
    fn name(&self) -> &str {
        "Chi2Test"
    }

    fn is_applicable(&self) -> bool {
        *self.applicable.get_or_init(|| {
            if self.a.integral == 0.0 || self.b.integral == 0.0 {
                return false;
            }
            match self.outcome() {
                Chi2Outcome::NotApplicable(reason) => {
                    log::debug!("Chi2Test not applicable: {}", reason);
                    false
                }
                Chi2Outcome::Computed(s) => {
                    s.ndf != -1
                        && s.chi2.is_finite()
                        && s.prob != 0.0
                        && !s.prob.is_nan()
                        && s.igood == 0
                }
            }
        })
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(
                "Chi2Test not applicable, cannot check validity".into(),
            ));
        }
        Ok(*self.valid.get_or_init(|| self.decision.passes(self.prob())))
    }

    fn label(&self) -> String {
        if !self.is_applicable() {
            return "not applicable".to_string();
        }
        self.decision.label(self.prob(), self.decision.passes(self.prob()))
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn score(&self) -> Option<f64> {
        let p = self.prob();
        p.is_finite().then_some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hd_core::Status;
    use hd_sample::{Hist1, Hist2, IntegralRange};

    fn sample(contents: &[f64]) -> Arc<Sample> {
        let mut h = Hist1::with_uniform_bins("h", contents.len(), 0.0, contents.len() as f64);
        h.content = contents.to_vec();
        Arc::new(Sample::from_hist1(&h, IntegralRange::default()).unwrap())
    }

    #[test]
    fn test_identical_samples_score_near_one() {
        let a = sample(&[4.0, 9.0, 25.0, 16.0, 8.0]);
        let check = Chi2Check::new(a.clone(), a, Chi2Check::DEFAULT_THRESHOLD, false);
        assert!(check.is_applicable());
        assert!(check.is_valid().unwrap());
        let score = check.score().unwrap();
        assert_relative_eq!(score, 1.0, epsilon = 1e-9);
        assert_eq!(check.status(), Status::Success);
    }

    #[test]
    fn test_empty_sample_inconclusive() {
        let a = sample(&[4.0, 9.0, 25.0]);
        let b = sample(&[0.0, 0.0, 0.0]);
        let check = Chi2Check::new(a, b, Chi2Check::DEFAULT_THRESHOLD, false);
        assert!(!check.is_applicable());
        assert_eq!(check.status(), Status::Inconclusive);
    }

    #[test]
    fn test_dimension_mismatch_inapplicable() {
        let a = sample(&[4.0, 9.0, 25.0, 16.0]);
        let mut h2 = Hist2::with_uniform_bins("h2", 2, 0.0, 2.0, 2, 0.0, 2.0);
        h2.content = vec![4.0, 9.0, 25.0, 16.0];
        let b = Arc::new(Sample::from_hist2(&h2, IntegralRange::default()).unwrap());
        let check = Chi2Check::new(a, b, Chi2Check::DEFAULT_THRESHOLD, false);
        assert!(!check.is_applicable());
        assert_eq!(check.status(), Status::Inconclusive);
    }

    #[test]
    fn test_weighted_pair_uses_swapped_regime() {
        // Weighted monitored sample against unweighted reference: must
        // still be evaluated (swapped into the unweighted-first branch).
        let mut hw = Hist1::with_uniform_bins("hw", 3, 0.0, 3.0);
        for x in [0.5, 1.5, 2.5] {
            for _ in 0..10 {
                hw.fill_weighted(x, 1.5);
            }
        }
        let a = Arc::new(Sample::from_hist1(&hw, IntegralRange::default()).unwrap());
        let b = sample(&[15.0, 15.0, 15.0]);
        assert!(a.weighted);
        let check = Chi2Check::new(a, b, Chi2Check::DEFAULT_THRESHOLD, false);
        assert!(check.is_applicable());
        assert!(check.is_valid().unwrap());
    }

    #[test]
    fn test_flow_inclusive_options_see_flow_disagreement() {
        let mut ha = Hist1::with_uniform_bins("h", 3, 0.0, 3.0);
        ha.content = vec![25.0, 30.0, 25.0];
        ha.underflow = 40.0;
        let mut hb = ha.clone();
        hb.underflow = 10.0;
        let a = Arc::new(Sample::from_hist1(&ha, IntegralRange::default()).unwrap());
        let b = Arc::new(Sample::from_hist1(&hb, IntegralRange::default()).unwrap());

        // Regular bins agree exactly, so the default flow-excluding check
        // sees perfect compatibility.
        let plain = Chi2Check::new(a.clone(), b.clone(), Chi2Check::DEFAULT_THRESHOLD, false);
        assert!(plain.is_applicable());
        assert!(plain.is_valid().unwrap());
        assert_relative_eq!(plain.score().unwrap(), 1.0, epsilon = 1e-9);

        let opts = Chi2Options { include_underflow: true, ..Chi2Options::default() };
        let flow = Chi2Check::with_options(a, b, Chi2Check::DEFAULT_THRESHOLD, false, opts);
        assert!(flow.is_applicable());
        assert!(!flow.is_valid().unwrap());
        assert!(flow.score().unwrap() < 0.01);
    }

    #[test]
    fn test_memoized_score_is_stable() {
        let a = sample(&[4.0, 9.0, 25.0, 16.0]);
        let b = sample(&[5.0, 8.0, 24.0, 17.0]);
        let check = Chi2Check::new(a, b, Chi2Check::DEFAULT_THRESHOLD, false);
        let s1 = check.score();
        let s2 = check.score();
        assert_eq!(s1, s2);
    }
}
