//! Efficiency-curve value type.

use serde::{Deserialize, Serialize};

/// A per-bin success-ratio curve with asymmetric uncertainty bounds.
///
/// Values live in `[0, 1]` per bin; the upper and lower uncertainties are
/// generally different (interval-based binomial errors). The adapter
/// collapses them to a single symmetric error by averaging, applied once
/// during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    /// Curve name.
    pub name: String,
    /// Bin edges (length = number of bins + 1).
    pub bin_edges: Vec<f64>,
    /// Per-bin efficiency value.
    pub value: Vec<f64>,
    /// Upward uncertainty per bin.
    pub error_up: Vec<f64>,
    /// Downward uncertainty per bin.
    pub error_down: Vec<f64>,
}

impl EfficiencyCurve {
    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.value.len()
    }

    /// Symmetrized per-bin error: the mean of the upward and downward
    /// uncertainties.
    pub fn symmetric_errors(&self) -> Vec<f64> {
        self.error_up
            .iter()
            .zip(&self.error_down)
            .map(|(up, down)| 0.5 * (up + down))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_errors_average() {
        let eff = EfficiencyCurve {
            name: "eff".into(),
            bin_edges: vec![0.0, 1.0, 2.0],
            value: vec![0.9, 0.5],
            error_up: vec![0.02, 0.10],
            error_down: vec![0.04, 0.10],
        };
        let e = eff.symmetric_errors();
        assert!((e[0] - 0.03).abs() < 1e-15);
        assert!((e[1] - 0.10).abs() < 1e-15);
    }
}
