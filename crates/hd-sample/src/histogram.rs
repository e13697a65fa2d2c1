//! Binned histogram value types with explicit flow bins.

use serde::{Deserialize, Serialize};

/// A one-dimensional binned histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hist1 {
    /// Histogram name.
    pub name: String,
    /// Bin edges (length = number of bins + 1, ascending).
    pub bin_edges: Vec<f64>,
    /// Bin contents (excluding under/overflow).
    pub content: Vec<f64>,
    /// Sum of weights squared per bin, if tracked.
    pub sumw2: Option<Vec<f64>>,
    /// Underflow bin content.
    pub underflow: f64,
    /// Overflow bin content.
    pub overflow: f64,
    /// Underflow sum of weights squared, if tracked.
    pub underflow_sumw2: Option<f64>,
    /// Overflow sum of weights squared, if tracked.
    pub overflow_sumw2: Option<f64>,
    /// Total number of entries.
    pub entries: f64,
}

impl Hist1 {
    /// Empty histogram with `n_bins` uniform bins over `[lo, hi)`.
    pub fn with_uniform_bins(name: &str, n_bins: usize, lo: f64, hi: f64) -> Self {
        let width = (hi - lo) / n_bins as f64;
        let bin_edges = (0..=n_bins).map(|i| lo + i as f64 * width).collect();
        Hist1 {
            name: name.to_string(),
            bin_edges,
            content: vec![0.0; n_bins],
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: None,
            overflow_sumw2: None,
            entries: 0.0,
        }
    }

    /// Number of bins (excluding under/overflow).
    pub fn n_bins(&self) -> usize {
        self.content.len()
    }

    /// Record one entry at `x`.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    /// Record one entry at `x` with weight `w`. Enables `sumw2` tracking
    /// the first time `w != 1`.
    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        if w != 1.0 && self.sumw2.is_none() {
            // Retroactively seed sumw2 from the unweighted contents.
            self.sumw2 = Some(self.content.clone());
            self.underflow_sumw2 = Some(self.underflow);
            self.overflow_sumw2 = Some(self.overflow);
        }
        self.entries += 1.0;
        // NaN coordinates cannot be ordered against the edges; they are
        // recorded as overflow.
        let last = *self.bin_edges.last().unwrap_or(&f64::INFINITY);
        if x.is_nan() || x >= last {
            self.overflow += w;
            if let Some(o) = self.overflow_sumw2.as_mut() {
                *o += w * w;
            }
            return;
        }
        if x < self.bin_edges[0] {
            self.underflow += w;
            if let Some(u) = self.underflow_sumw2.as_mut() {
                *u += w * w;
            }
            return;
        }
        // partition_point gives the first edge above x.
        let bin = self.bin_edges.partition_point(|e| *e <= x) - 1;
        self.content[bin] += w;
        if let Some(sw) = self.sumw2.as_mut() {
            sw[bin] += w * w;
        }
    }

    /// Per-bin variance: `sumw2` when tracked, else the content itself
    /// (Poisson counts).
    pub fn variances(&self) -> Vec<f64> {
        match &self.sumw2 {
            Some(sw) => sw.clone(),
            None => self.content.clone(),
        }
    }
}

/// A two-dimensional binned histogram, contents stored row-major
/// (`iy * n_bins_x + ix`). All out-of-range regions collapse into single
/// underflow/overflow scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hist2 {
    /// Histogram name.
    pub name: String,
    /// Bin edges along x (length = n_bins_x + 1).
    pub x_edges: Vec<f64>,
    /// Bin edges along y (length = n_bins_y + 1).
    pub y_edges: Vec<f64>,
    /// Bin contents, row-major, length = n_bins_x * n_bins_y.
    pub content: Vec<f64>,
    /// Sum of weights squared per bin, if tracked.
    pub sumw2: Option<Vec<f64>>,
    /// Total content of all out-of-range regions below/left.
    pub underflow: f64,
    /// Total content of all out-of-range regions above/right.
    pub overflow: f64,
    /// Underflow sum of weights squared, if tracked.
    pub underflow_sumw2: Option<f64>,
    /// Overflow sum of weights squared, if tracked.
    pub overflow_sumw2: Option<f64>,
    /// Total number of entries.
    pub entries: f64,
}

impl Hist2 {
    /// Empty histogram with uniform binning on both axes.
    pub fn with_uniform_bins(
        name: &str,
        n_x: usize,
        x_lo: f64,
        x_hi: f64,
        n_y: usize,
        y_lo: f64,
        y_hi: f64,
    ) -> Self {
        let wx = (x_hi - x_lo) / n_x as f64;
        let wy = (y_hi - y_lo) / n_y as f64;
        Hist2 {
            name: name.to_string(),
            x_edges: (0..=n_x).map(|i| x_lo + i as f64 * wx).collect(),
            y_edges: (0..=n_y).map(|i| y_lo + i as f64 * wy).collect(),
            content: vec![0.0; n_x * n_y],
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: None,
            overflow_sumw2: None,
            entries: 0.0,
        }
    }

    /// Bins along x.
    pub fn n_bins_x(&self) -> usize {
        self.x_edges.len().saturating_sub(1)
    }

    /// Bins along y.
    pub fn n_bins_y(&self) -> usize {
        self.y_edges.len().saturating_sub(1)
    }

    /// Record one entry at `(x, y)`.
    pub fn fill(&mut self, x: f64, y: f64) {
        self.entries += 1.0;
        // NaN coordinates cannot be ordered against the edges; they are
        // recorded as overflow.
        if x.is_nan() || y.is_nan() {
            self.overflow += 1.0;
            return;
        }
        let nx = self.n_bins_x();
        let below_x = x < self.x_edges[0];
        let below_y = y < self.y_edges[0];
        let above_x = x >= *self.x_edges.last().unwrap_or(&f64::NEG_INFINITY);
        let above_y = y >= *self.y_edges.last().unwrap_or(&f64::NEG_INFINITY);
        if below_x || below_y {
            self.underflow += 1.0;
            return;
        }
        if above_x || above_y {
            self.overflow += 1.0;
            return;
        }
        let ix = self.x_edges.partition_point(|e| *e <= x) - 1;
        let iy = self.y_edges.partition_point(|e| *e <= y) - 1;
        self.content[iy * nx + ix] += 1.0;
    }

    /// Per-bin variance: `sumw2` when tracked, else the content itself.
    pub fn variances(&self) -> Vec<f64> {
        match &self.sumw2 {
            Some(sw) => sw.clone(),
            None => self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_places_entries() {
        let mut h = Hist1::with_uniform_bins("h", 4, 0.0, 4.0);
        h.fill(0.5);
        h.fill(2.5);
        h.fill(2.7);
        h.fill(-1.0);
        h.fill(9.0);
        assert_eq!(h.content, vec![1.0, 0.0, 2.0, 0.0]);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 1.0);
        assert_eq!(h.entries, 5.0);
    }

    #[test]
    fn test_weighted_fill_enables_sumw2() {
        let mut h = Hist1::with_uniform_bins("h", 2, 0.0, 2.0);
        h.fill(0.5);
        assert!(h.sumw2.is_none());
        h.fill_weighted(0.5, 2.0);
        let sw = h.sumw2.as_ref().expect("sumw2 enabled");
        // 1 (seeded from the unweighted entry) + 2^2.
        assert_eq!(sw[0], 5.0);
        assert_eq!(h.content[0], 3.0);
    }

    #[test]
    fn test_nan_fill_goes_to_overflow() {
        let mut h = Hist1::with_uniform_bins("h", 4, 0.0, 4.0);
        h.fill(f64::NAN);
        h.fill_weighted(f64::NAN, 2.0);
        assert_eq!(h.overflow, 3.0);
        assert_eq!(h.entries, 2.0);
        assert!(h.content.iter().all(|c| *c == 0.0));
        assert_eq!(h.underflow, 0.0);
    }

    #[test]
    fn test_hist2_nan_fill_goes_to_overflow() {
        let mut h = Hist2::with_uniform_bins("h2", 2, 0.0, 2.0, 2, 0.0, 2.0);
        h.fill(f64::NAN, 0.5);
        h.fill(0.5, f64::NAN);
        assert_eq!(h.overflow, 2.0);
        assert!(h.content.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_hist2_fill_row_major() {
        let mut h = Hist2::with_uniform_bins("h2", 2, 0.0, 2.0, 2, 0.0, 2.0);
        h.fill(0.5, 1.5); // ix=0, iy=1
        h.fill(1.5, 0.5); // ix=1, iy=0
        h.fill(5.0, 0.5); // overflow
        assert_eq!(h.content, vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(h.overflow, 1.0);
    }
}
