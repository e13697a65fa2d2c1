//! The uniform `Sample` view every compatibility check consumes.

use hd_core::{Error, Result};

use crate::efficiency::EfficiencyCurve;
use crate::histogram::{Hist1, Hist2};

/// Flow-bin inclusion policy for the adapter's integral.
///
/// The default matches the upstream accessor semantics: the integral runs
/// from the underflow bin through the last regular bin, excluding overflow.
#[derive(Debug, Clone, Copy)]
pub struct IntegralRange {
    /// Include the underflow bin in the integral.
    pub include_underflow: bool,
    /// Include the overflow bin in the integral.
    pub include_overflow: bool,
}

impl Default for IntegralRange {
    fn default() -> Self {
        IntegralRange { include_underflow: true, include_overflow: false }
    }
}

/// Normalized, immutable view of one binned distribution.
///
/// Built exactly once per comparison by the adapter; checks only ever see
/// this shape and never mutate it. `integral` is computed over the
/// configured flow range and is not required to equal the sum of `content`.
#[derive(Debug, Clone)]
pub struct Sample {
    /// 1 or 2.
    pub dimension: u8,
    /// Bin counts per axis.
    pub dims: Vec<usize>,
    /// Ordered bin contents (non-flow bins; row-major for 2-D).
    pub content: Vec<f64>,
    /// Ordered bin errors, same length as `content`.
    pub error: Vec<f64>,
    /// Integral over the configured range.
    pub integral: f64,
    /// Error on the integral.
    pub integral_error: f64,
    /// Whether the source carried explicit per-bin variances differing
    /// from the contents (drives the chi-square weighting regime).
    pub weighted: bool,
    /// Underflow (content, variance), when the source tracks flow bins.
    pub underflow: Option<(f64, f64)>,
    /// Overflow (content, variance), when the source tracks flow bins.
    pub overflow: Option<(f64, f64)>,
}

fn check_parallel(name: &str, content: &[f64], variance: &[f64]) -> Result<()> {
    if content.len() != variance.len() {
        return Err(Error::Validation(format!(
            "{}: content/variance length mismatch: {} vs {}",
            name,
            content.len(),
            variance.len()
        )));
    }
    Ok(())
}

fn is_weighted(content: &[f64], sumw2: Option<&Vec<f64>>) -> bool {
    match sumw2 {
        Some(sw) => content.iter().zip(sw).any(|(c, v)| (c - v).abs() > 1e-12),
        None => false,
    }
}

impl Sample {
    /// Adapt a 1-D histogram.
    pub fn from_hist1(h: &Hist1, range: IntegralRange) -> Result<Sample> {
        let variance = h.variances();
        check_parallel(&h.name, &h.content, &variance)?;
        let underflow = (h.underflow, h.underflow_sumw2.unwrap_or(h.underflow));
        let overflow = (h.overflow, h.overflow_sumw2.unwrap_or(h.overflow));
        let (integral, integral_error) =
            integral_and_error(&h.content, &variance, underflow, overflow, range);
        Ok(Sample {
            dimension: 1,
            dims: vec![h.n_bins()],
            error: variance.iter().map(|v| v.sqrt()).collect(),
            content: h.content.clone(),
            integral,
            integral_error,
            weighted: is_weighted(&h.content, h.sumw2.as_ref()),
            underflow: Some(underflow),
            overflow: Some(overflow),
        })
    }

    /// Adapt a 2-D histogram (row-major flattening).
    pub fn from_hist2(h: &Hist2, range: IntegralRange) -> Result<Sample> {
        let variance = h.variances();
        check_parallel(&h.name, &h.content, &variance)?;
        let underflow = (h.underflow, h.underflow_sumw2.unwrap_or(h.underflow));
        let overflow = (h.overflow, h.overflow_sumw2.unwrap_or(h.overflow));
        let (integral, integral_error) =
            integral_and_error(&h.content, &variance, underflow, overflow, range);
        Ok(Sample {
            dimension: 2,
            dims: vec![h.n_bins_x(), h.n_bins_y()],
            error: variance.iter().map(|v| v.sqrt()).collect(),
            content: h.content.clone(),
            integral,
            integral_error,
            weighted: is_weighted(&h.content, h.sumw2.as_ref()),
            underflow: Some(underflow),
            overflow: Some(overflow),
        })
    }

    /// Materialize an efficiency curve into the binned shape. Asymmetric
    /// errors collapse to their symmetric mean here, once.
    pub fn from_efficiency(eff: &EfficiencyCurve) -> Result<Sample> {
        if eff.value.len() != eff.error_up.len() || eff.value.len() != eff.error_down.len() {
            return Err(Error::Validation(format!(
                "{}: value/error length mismatch",
                eff.name
            )));
        }
        let error = eff.symmetric_errors();
        let integral: f64 = eff.value.iter().sum();
        let integral_error = error.iter().map(|e| e * e).sum::<f64>().sqrt();
        Ok(Sample {
            dimension: 1,
            dims: vec![eff.n_bins()],
            content: eff.value.clone(),
            error,
            integral,
            integral_error,
            // Efficiency bins are ratios, not counts; variances never equal
            // contents, so the weighted chi-square branches apply.
            weighted: true,
            underflow: None,
            overflow: None,
        })
    }

    /// Number of non-flow bins.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// True when the sample has no bins.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Per-bin variances (`error` squared).
    pub fn variances(&self) -> Vec<f64> {
        self.error.iter().map(|e| e * e).collect()
    }
}

fn integral_and_error(
    content: &[f64],
    variance: &[f64],
    underflow: (f64, f64),
    overflow: (f64, f64),
    range: IntegralRange,
) -> (f64, f64) {
    let mut integral: f64 = content.iter().sum();
    let mut var: f64 = variance.iter().sum();
    if range.include_underflow {
        integral += underflow.0;
        var += underflow.1;
    }
    if range.include_overflow {
        integral += overflow.0;
        var += overflow.1;
    }
    (integral, var.sqrt())
}
