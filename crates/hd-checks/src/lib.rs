//! # hd-checks
//!
//! The compatibility-check framework and the concrete statistical checks.
//!
//! Every check binds one ordered sample pair `(monitored, reference)` and a
//! threshold at construction. Applicability and validity are computed at
//! most once and cached; asking for validity while inapplicable is a
//! contract violation surfaced as an error, never a silent default. Check
//! preconditions that fail (empty integrals, shape mismatches, degenerate
//! variances) make the check inapplicable; they are expected outcomes, not
//! errors.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chi2;
pub mod composite;
pub mod framework;
pub mod integral;
pub mod kolmogorov;
pub mod ratio;
pub mod registry;
pub mod residual;

pub use chi2::Chi2Check;
pub use composite::CompositeCheck;
pub use framework::{CompatCheck, ThresholdDecision, ThresholdOp};
pub use integral::IntegralCheck;
pub use kolmogorov::KolmogorovCheck;
pub use ratio::RatioCheck;
pub use registry::{build_check, CheckParams, CHECK_KINDS};
pub use residual::ResidualCheck;
