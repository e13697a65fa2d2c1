//! # hd-sample
//!
//! The sample adapter for histdrift.
//!
//! Three external data shapes (1-D binned histograms, 2-D binned
//! histograms, and efficiency curves) are normalized into one uniform
//! [`Sample`] view (ordered bin contents, ordered bin errors, scalar
//! integral with error) exactly once, before any compatibility check is
//! constructed. Checks never see the raw shapes and never mutate samples.
//!
//! Reading any on-disk format is out of scope: snapshots reach this crate
//! as in-memory [`SnapshotObject`] values through the [`SampleSource`]
//! ingest trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod efficiency;
pub mod histogram;
pub mod sample;
pub mod source;

pub use efficiency::EfficiencyCurve;
pub use histogram::{Hist1, Hist2};
pub use sample::{IntegralRange, Sample};
pub use source::{MemorySource, SampleSource, SnapshotObject};
