//! # hd-compare
//!
//! Snapshot pairing and comparison orchestration: resolves the configured
//! check table per element, instantiates the checks against adapted sample
//! pairs, and aggregates results into a serializable report.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod matcher;
pub mod result;

pub use config::{CheckTable, Config};
pub use matcher::compare;
pub use result::{CheckRecord, Comparison, ComparisonItem, ComparisonReport, ItemReport};
