//! Explicit table mapping configuration keys to check constructors.

use std::sync::Arc;

use hd_sample::Sample;
use serde::{Deserialize, Serialize};

use crate::chi2::Chi2Check;
use crate::framework::CompatCheck;
use crate::integral::IntegralCheck;
use crate::kolmogorov::KolmogorovCheck;
use crate::ratio::RatioCheck;
use crate::residual::ResidualCheck;

/// The closed set of configurable check kinds, in evaluation order.
pub const CHECK_KINDS: [&str; 5] =
    ["Chi2Test", "KolmogorovTest", "RatioCheck", "ResidualCheck", "IntegralCheck"];

/// Per-check parameters from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckParams {
    /// Threshold override; each kind has a built-in default.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Construct the check registered under `kind` against the pair `(a, b)`.
/// Returns `None` for unknown kinds (a configuration diagnostic, not an
/// error).
pub fn build_check(
    kind: &str,
    a: &Arc<Sample>,
    b: &Arc<Sample>,
    params: &CheckParams,
    disabled: bool,
) -> Option<Box<dyn CompatCheck>> {
    let t = params.threshold;
    match kind {
        "Chi2Test" => Some(Box::new(Chi2Check::new(
            a.clone(),
            b.clone(),
            t.unwrap_or(Chi2Check::DEFAULT_THRESHOLD),
            disabled,
        ))),
        "KolmogorovTest" => Some(Box::new(KolmogorovCheck::new(
            a.clone(),
            b.clone(),
            t.unwrap_or(KolmogorovCheck::DEFAULT_THRESHOLD),
            disabled,
        ))),
        "RatioCheck" => Some(Box::new(RatioCheck::new(
            a.clone(),
            b.clone(),
            t.unwrap_or(RatioCheck::DEFAULT_THRESHOLD),
            disabled,
        ))),
        "ResidualCheck" => Some(Box::new(ResidualCheck::new(
            a.clone(),
            b.clone(),
            t.unwrap_or(ResidualCheck::DEFAULT_THRESHOLD),
            disabled,
        ))),
        "IntegralCheck" => Some(Box::new(IntegralCheck::new(
            a.clone(),
            b.clone(),
            t.unwrap_or(IntegralCheck::DEFAULT_THRESHOLD),
            disabled,
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_sample::{Hist1, IntegralRange};

    fn sample() -> Arc<Sample> {
        let mut h = Hist1::with_uniform_bins("h", 3, 0.0, 3.0);
        h.content = vec![4.0, 9.0, 16.0];
        Arc::new(Sample::from_hist1(&h, IntegralRange::default()).unwrap())
    }

    #[test]
    fn test_every_kind_constructs() {
        let a = sample();
        for kind in CHECK_KINDS {
            let check = build_check(kind, &a, &a, &CheckParams::default(), false)
                .unwrap_or_else(|| panic!("kind {} not registered", kind));
            assert_eq!(check.name(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_none() {
        let a = sample();
        assert!(build_check("FitCheck", &a, &a, &CheckParams::default(), false).is_none());
    }

    #[test]
    fn test_threshold_override_applies() {
        let a = sample();
        // Identical samples give a KS score of exactly 1.0; an impossible
        // threshold of 2.0 must flip the result to invalid.
        let params = CheckParams { threshold: Some(2.0) };
        let check = build_check("KolmogorovTest", &a, &a, &params, false).unwrap();
        assert!(check.is_applicable());
        assert!(!check.is_valid().unwrap());
    }
}
