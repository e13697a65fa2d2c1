//! Two-sample Kolmogorov-Smirnov compatibility check.

use std::sync::Arc;

use hd_core::{Error, Memo, Result};
use hd_prob::ks_binned;
use hd_sample::Sample;

use crate::framework::{CompatCheck, ThresholdDecision, ThresholdOp};

/// Binned two-sample KS test; the score is the KS probability, so higher
/// means more compatible. One-dimensional samples only: the flattened
/// cumulative ordering of a 2-D array is not a meaningful CDF.
pub struct KolmogorovCheck {
    a: Arc<Sample>,
    b: Arc<Sample>,
    decision: ThresholdDecision,
    disabled: bool,
    score: Memo<f64>,
    applicable: Memo<bool>,
    valid: Memo<bool>,
}

impl KolmogorovCheck {
    /// One-sigma convention.
    pub const DEFAULT_THRESHOLD: f64 = 0.68;

    /// Bind a sample pair.
    pub fn new(a: Arc<Sample>, b: Arc<Sample>, threshold: f64, disabled: bool) -> Self {
        KolmogorovCheck {
            a,
            b,
            decision: ThresholdDecision { threshold, op: ThresholdOp::Greater },
            disabled,
            score: Memo::new(),
            applicable: Memo::new(),
            valid: Memo::new(),
        }
    }

    fn score_value(&self) -> f64 {
        *self.score.get_or_init(|| {
            if self.a.dimension != 1 || self.b.dimension != 1 {
                return f64::NAN;
            }
            match ks_binned(&self.a.content, &self.a.error, &self.b.content, &self.b.error) {
                Some(s) => s.prob,
                None => f64::NAN,
            }
        })
    }
}

impl CompatCheck for KolmogorovCheck {
    fn name(&self) -> &str {
        "KolmogorovTest"
    }

    fn is_applicable(&self) -> bool {
        *self.applicable.get_or_init(|| {
            if self.a.integral == 0.0 || self.b.integral == 0.0 {
                return false;
            }
            if self.a.integral.is_nan() || self.b.integral.is_nan() {
                return false;
            }
            let s = self.score_value();
            !s.is_nan() && s != 0.0
        })
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(
                "KolmogorovTest not applicable, cannot check validity".into(),
            ));
        }
        Ok(*self.valid.get_or_init(|| self.decision.passes(self.score_value())))
    }

    fn label(&self) -> String {
        if !self.is_applicable() {
            return "not applicable".to_string();
        }
        self.decision.label(self.score_value(), self.decision.passes(self.score_value()))
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn score(&self) -> Option<f64> {
        let s = self.score_value();
        s.is_finite().then_some(s)
    }
}
