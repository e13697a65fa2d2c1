//! # hd-prob
//!
//! Statistics building blocks for histdrift.
//!
//! This crate hosts the quantitative procedures the compatibility checks
//! wrap, kept free of any sample-adapter or framework dependency:
//! - the two-sample chi-square engine (unweighted/weighted regimes,
//!   under/overflow inclusion, degenerate-bin handling)
//! - the Kolmogorov distribution and the binned two-sample KS test

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chi2;
pub mod kolmogorov;

pub use chi2::{chi2_test, BinnedInput, Chi2Options, Chi2Outcome, Chi2Regime, Chi2Summary};
pub use kolmogorov::{kolmogorov_prob, ks_binned, KsSummary};
