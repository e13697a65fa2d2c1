//! Bin-wise residual pull compatibility check.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hd_core::{Error, Memo, Result};
use hd_sample::Sample;
use hd_viz::{write_if_absent, PullPanelArtifact};

use crate::framework::{plot_stem, CompatCheck};

/// Builds the bin-wise difference `a_i - b_i` over the combined error
/// `sqrt(err_a^2 + err_b^2)`; bins without error information contribute a
/// pull of zero. Valid while the count of pulls at or beyond the threshold
/// stays below `sqrt(total bins)`.
pub struct ResidualCheck {
    pulls: Vec<f64>,
    threshold: f64,
    disabled: bool,
    valid: Memo<bool>,
}

impl ResidualCheck {
    /// One-sigma pull threshold.
    pub const DEFAULT_THRESHOLD: f64 = 1.0;

    /// Bind a sample pair; pulls are computed here, once.
    pub fn new(a: Arc<Sample>, b: Arc<Sample>, threshold: f64, disabled: bool) -> Self {
        let n = if a.len() == b.len() { a.len() } else { 0 };
        let mut pulls = Vec::with_capacity(n);
        for i in 0..n {
            let d = a.content[i] - b.content[i];
            let e = (a.error[i] * a.error[i] + b.error[i] * b.error[i]).sqrt();
            if e > 0.0 {
                pulls.push(d.abs() / e);
            } else {
                pulls.push(0.0);
            }
        }
        ResidualCheck { pulls, threshold, disabled, valid: Memo::new() }
    }

    fn outliers(&self) -> usize {
        self.pulls.iter().filter(|p| !p.is_nan() && **p >= self.threshold).count()
    }

    fn outlier_limit(&self) -> f64 {
        (self.pulls.len() as f64).sqrt()
    }
}

impl CompatCheck for ResidualCheck {
    fn name(&self) -> &str {
        "ResidualCheck"
    }

    fn is_applicable(&self) -> bool {
        !self.pulls.is_empty() && self.pulls.iter().any(|p| !p.is_nan())
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(
                "ResidualCheck not applicable, cannot check validity".into(),
            ));
        }
        Ok(*self.valid.get_or_init(|| (self.outliers() as f64) < self.outlier_limit()))
    }

    fn label(&self) -> String {
        if !self.is_applicable() {
            return "not applicable".to_string();
        }
        let valid = (self.outliers() as f64) < self.outlier_limit();
        let marker = if valid { "" } else { "! " };
        format!(
            "{}{} of {} residual pulls >= {:.2} (allowed < {:.2})",
            marker,
            self.outliers(),
            self.pulls.len(),
            self.threshold,
            self.outlier_limit()
        )
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn ensure_plot(&self, out_dir: &Path, key: &str) -> Result<Option<PathBuf>> {
        if !self.is_applicable() {
            return Ok(None);
        }
        let artifact = PullPanelArtifact::new(key, self.pulls.clone(), self.threshold);
        let path = out_dir.join(plot_stem(key, self.name()));
        Ok(Some(write_if_absent(&path, &artifact)?))
    }
}
