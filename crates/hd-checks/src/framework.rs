//! The common check contract and the threshold-decision helper.

use std::path::{Path, PathBuf};

use hd_core::{Result, Status};

/// Ordering operator comparing a score against its threshold. Fixed per
/// check kind: probability-style scores pass when high, deviation-style
/// scores pass when low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    /// `score < threshold`
    Less,
    /// `score <= threshold`
    LessEq,
    /// `score > threshold`
    Greater,
    /// `score >= threshold`
    GreaterEq,
}

impl ThresholdOp {
    /// Apply the operator.
    pub fn apply(self, score: f64, threshold: f64) -> bool {
        match self {
            ThresholdOp::Less => score < threshold,
            ThresholdOp::LessEq => score <= threshold,
            ThresholdOp::Greater => score > threshold,
            ThresholdOp::GreaterEq => score >= threshold,
        }
    }

    /// Rendered operator.
    pub fn symbol(self) -> &'static str {
        match self {
            ThresholdOp::Less => "<",
            ThresholdOp::LessEq => "<=",
            ThresholdOp::Greater => ">",
            ThresholdOp::GreaterEq => ">=",
        }
    }
}

/// Score-vs-threshold decision shared by the quantitative checks.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdDecision {
    /// Configured threshold.
    pub threshold: f64,
    /// Ordering operator for this check kind.
    pub op: ThresholdOp,
}

impl ThresholdDecision {
    /// True when the score passes.
    pub fn passes(&self, score: f64) -> bool {
        self.op.apply(score, self.threshold)
    }

    /// Human-readable evidence line; invalid results get a `! ` prefix.
    pub fn label(&self, score: f64, valid: bool) -> String {
        let marker = if valid { "" } else { "! " };
        format!("{}{:.4} {} {:.4}", marker, score, self.op.symbol(), self.threshold)
    }
}

/// Common contract of every compatibility check.
///
/// Implementations memoize `is_applicable` and `is_valid`: once computed
/// they are stable for the life of the instance (the underlying samples are
/// immutable for the duration of a comparison). `is_valid` is only
/// meaningful when applicable.
pub trait CompatCheck {
    /// Check kind identifier (configuration key).
    fn name(&self) -> &str;

    /// Whether the check's preconditions hold on the bound pair. Computed
    /// once, cached.
    fn is_applicable(&self) -> bool;

    /// Whether the pair passes the check. Computed once, cached. Returns
    /// `Error::IllegalState` when called while inapplicable.
    fn is_valid(&self) -> Result<bool>;

    /// Human-readable explanation of the outcome.
    fn label(&self) -> String;

    /// Whether the configuration disabled this check (still constructed
    /// for reporting, excluded from status aggregation).
    fn is_disabled(&self) -> bool {
        false
    }

    /// Numeric score, for threshold checks.
    fn score(&self) -> Option<f64> {
        None
    }

    /// Derived tri-state outcome.
    fn status(&self) -> Status {
        if !self.is_applicable() {
            return Status::Inconclusive;
        }
        match self.is_valid() {
            Ok(true) => Status::Success,
            Ok(false) => Status::Failure,
            Err(e) => {
                // Unreachable after the applicability guard above; an error
                // here is a contract bug in the check itself.
                log::warn!("{}: validity evaluation failed: {}", self.name(), e);
                Status::Inconclusive
            }
        }
    }

    /// Write this check's diagnostic artifact under `out_dir`, named after
    /// the item `key`. At most one artifact per instance; skips when the
    /// file already exists. Default: no artifact.
    fn ensure_plot(&self, _out_dir: &Path, _key: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// File-system-safe artifact stem for an item key.
pub(crate) fn plot_stem(key: &str, check: &str) -> String {
    let safe: String =
        key.chars().map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' }).collect();
    format!("{}_{}.json", safe, check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_semantics() {
        assert!(ThresholdOp::Greater.apply(0.9, 0.68));
        assert!(!ThresholdOp::Greater.apply(0.68, 0.68));
        assert!(ThresholdOp::Less.apply(1.2, 3.0));
        assert!(ThresholdOp::GreaterEq.apply(3.0, 3.0));
        assert!(ThresholdOp::LessEq.apply(3.0, 3.0));
    }

    #[test]
    fn test_label_marks_invalid() {
        let d = ThresholdDecision { threshold: 0.01, op: ThresholdOp::Greater };
        assert_eq!(d.label(0.5, true), "0.5000 > 0.0100");
        assert_eq!(d.label(0.001, false), "! 0.0010 > 0.0100");
    }

    #[test]
    fn test_plot_stem_sanitizes() {
        assert_eq!(plot_stem("a/b c", "RatioCheck"), "a_b_c_RatioCheck.json");
    }
}
