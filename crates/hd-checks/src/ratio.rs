//! Bin-wise ratio pull compatibility check.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hd_core::{Error, Memo, Result};
use hd_sample::Sample;
use hd_viz::{write_if_absent, RatioPanelArtifact};

use crate::framework::{plot_stem, CompatCheck};

/// Builds the bin-wise ratio `a_i / b_i` with quotient error propagation
/// (bins with an empty reference are excluded), converts it to pulls
/// `(r_i - 1) / err(r_i)`, and tolerates a statistically expected number of
/// outliers: the pair is valid while the count of pulls at or beyond the
/// threshold stays below `sqrt(considered bins)`.
pub struct RatioCheck {
    ratio: Vec<f64>,
    ratio_error: Vec<f64>,
    pulls: Vec<f64>,
    threshold: f64,
    disabled: bool,
    valid: Memo<bool>,
}

impl RatioCheck {
    /// Three-sigma pull threshold.
    pub const DEFAULT_THRESHOLD: f64 = 3.0;

    /// Bind a sample pair; ratios and pulls are computed here, once.
    pub fn new(a: Arc<Sample>, b: Arc<Sample>, threshold: f64, disabled: bool) -> Self {
        let n = if a.len() == b.len() { a.len() } else { 0 };
        let mut ratio = Vec::with_capacity(n);
        let mut ratio_error = Vec::with_capacity(n);
        let mut pulls = Vec::new();
        for i in 0..n {
            let bv = b.content[i];
            if bv == 0.0 {
                ratio.push(f64::NAN);
                ratio_error.push(f64::NAN);
                continue;
            }
            let av = a.content[i];
            let r = av / bv;
            // Quotient propagation without dividing by the numerator, so
            // empty monitored bins stay well-defined.
            let ea = a.error[i];
            let eb = b.error[i];
            let err = ((ea / bv) * (ea / bv) + (av * eb / (bv * bv)) * (av * eb / (bv * bv))).sqrt();
            ratio.push(r);
            ratio_error.push(err);
            if r != 0.0 && err != 0.0 && !r.is_nan() && !err.is_nan() {
                pulls.push((r - 1.0) / err);
            }
        }
        RatioCheck { ratio, ratio_error, pulls, threshold, disabled, valid: Memo::new() }
    }

    fn outliers(&self) -> usize {
        self.pulls.iter().filter(|p| p.abs() >= self.threshold).count()
    }

    fn outlier_limit(&self) -> f64 {
        (self.pulls.len() as f64).sqrt()
    }
}

impl CompatCheck for RatioCheck {
    fn name(&self) -> &str {
        "RatioCheck"
    }

    fn is_applicable(&self) -> bool {
        !self.pulls.is_empty()
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(
                "RatioCheck not applicable, cannot check validity".into(),
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
            "{}{} of {} ratio pulls >= {:.2} (allowed < {:.2})",
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
        let artifact = RatioPanelArtifact::new(key, self.ratio.clone(), self.ratio_error.clone());
        let path = out_dir.join(plot_stem(key, self.name()));
        Ok(Some(write_if_absent(&path, &artifact)?))
    }
}
