//! Integral-consistency compatibility check.

use std::sync::Arc;

use hd_core::{Error, Memo, Result};
use hd_sample::Sample;

use crate::framework::{CompatCheck, ThresholdDecision, ThresholdOp};

/// Compares total integrated content:
/// `sigma = |integral_a - integral_b| / sqrt(err_a^2 + err_b^2)`.
///
/// When the first sample's integral error is zero, sigma is infinite by
/// construction and the check is never applicable. Lower sigma means more
/// compatible.
pub struct IntegralCheck {
    sigma: f64,
    decision: ThresholdDecision,
    disabled: bool,
    valid: Memo<bool>,
}

impl IntegralCheck {
    /// Three combined standard deviations.
    pub const DEFAULT_THRESHOLD: f64 = 3.0;

    /// Bind a sample pair; sigma is computed here, once.
    pub fn new(a: Arc<Sample>, b: Arc<Sample>, threshold: f64, disabled: bool) -> Self {
        let sigma = if a.integral_error > 0.0 {
            let combined =
                (a.integral_error * a.integral_error + b.integral_error * b.integral_error).sqrt();
            (a.integral - b.integral).abs() / combined
        } else {
            f64::INFINITY
        };
        IntegralCheck {
            sigma,
            decision: ThresholdDecision { threshold, op: ThresholdOp::Less },
            disabled,
            valid: Memo::new(),
        }
    }
}

impl CompatCheck for IntegralCheck {
    fn name(&self) -> &str {
        "IntegralCheck"
    }

    fn is_applicable(&self) -> bool {
        self.sigma.is_finite()
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(
                "IntegralCheck not applicable, cannot check validity".into(),
            ));
        }
        Ok(*self.valid.get_or_init(|| self.decision.passes(self.sigma)))
    }

    fn label(&self) -> String {
        if !self.is_applicable() {
            return "not applicable".to_string();
        }
        self.decision.label(self.sigma, self.decision.passes(self.sigma))
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn score(&self) -> Option<f64> {
        self.sigma.is_finite().then_some(self.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::Status;
    use hd_sample::{Hist1, IntegralRange};

    fn sample(contents: &[f64]) -> Arc<Sample> {
        let mut h = Hist1::with_uniform_bins("h", contents.len(), 0.0, contents.len() as f64);
        h.content = contents.to_vec();
        Arc::new(Sample::from_hist1(&h, IntegralRange::default()).unwrap())
    }

    #[test]
    fn test_equal_integrals_pass() {
        let a = sample(&[10.0, 20.0, 10.0]);
        let check = IntegralCheck::new(a.clone(), a, IntegralCheck::DEFAULT_THRESHOLD, false);
        assert!(check.is_applicable());
        assert!(check.is_valid().unwrap());
        assert_eq!(check.score(), Some(0.0));
    }

    #[test]
    fn test_inapplicable_iff_zero_error_on_first_sample() {
        let empty = sample(&[0.0, 0.0]);
        let full = sample(&[10.0, 20.0]);
        // Zero integral error on A: never applicable.
        let check = IntegralCheck::new(empty.clone(), full.clone(), 3.0, false);
        assert!(!check.is_applicable());
        assert_eq!(check.status(), Status::Inconclusive);
        // Zero error on B only: still applicable.
        let check = IntegralCheck::new(full, empty, 3.0, false);
        assert!(check.is_applicable());
    }

    #[test]
    fn test_large_discrepancy_fails() {
        let a = sample(&[100.0, 100.0]);
        let b = sample(&[10.0, 10.0]);
        let check = IntegralCheck::new(a, b, IntegralCheck::DEFAULT_THRESHOLD, false);
        assert!(check.is_applicable());
        assert!(!check.is_valid().unwrap());
        assert_eq!(check.status(), Status::Failure);
        // |200 - 20| / sqrt(200 + 20) ~ 12.1 sigma.
        assert!(check.score().unwrap() > 10.0);
    }
}
