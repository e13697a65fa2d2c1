//! Comparison result model.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use hd_checks::CompatCheck;
use hd_core::{Result, Status};
use hd_sample::Sample;
use hd_viz::ArtifactMeta;

/// Schema tag for serialized comparison reports.
pub const REPORT_SCHEMA_VERSION: &str = "histdrift_report_v0";

/// One matched element with its evaluated checks.
pub struct ComparisonItem {
    /// Element name shared by both snapshots.
    pub key: String,
    /// Adapted sample from the first snapshot.
    pub sample_a: Arc<Sample>,
    /// Adapted sample from the second snapshot.
    pub sample_b: Arc<Sample>,
    /// Instantiated checks, disabled ones included.
    pub checks: Vec<Box<dyn CompatCheck>>,
}

impl ComparisonItem {
    /// Aggregate status over the enabled checks.
    ///
    /// Disabled checks are carried for reporting but never vote.
    pub fn status(&self) -> Status {
        Status::aggregate(
            self.checks
                .iter()
                .filter(|c| !c.is_disabled())
                .map(|c| c.status()),
        )
    }

    /// Serializable per-check summaries.
    pub fn records(&self) -> Vec<CheckRecord> {
        self.checks
            .iter()
            .map(|c| CheckRecord {
                name: c.name().to_string(),
                status: c.status(),
                label: c.label(),
                score: c.score().filter(|s| !s.is_nan()),
                disabled: c.is_disabled(),
            })
            .collect()
    }

    /// Write the plot artifacts of the enabled checks that produce one.
    ///
    /// Existing files are left untouched, so repeated calls are cheap.
    pub fn ensure_plots(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for check in &self.checks {
            if check.is_disabled() {
                continue;
            }
            if let Some(path) = check.ensure_plot(out_dir, &self.key)? {
                written.push(path);
            }
        }
        Ok(written)
    }
}

impl std::fmt::Debug for ComparisonItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonItem")
            .field("key", &self.key)
            .field("status", &self.status())
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Per-check summary in a serialized report.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    /// Check kind name.
    pub name: String,
    /// Evaluated status.
    pub status: Status,
    /// Human-readable score line.
    pub label: String,
    /// Raw score, omitted when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Whether configuration disabled this check.
    pub disabled: bool,
}

/// Full result of comparing two snapshots.
#[derive(Debug)]
pub struct Comparison {
    /// Identifier of the first snapshot.
    pub file_a: String,
    /// Identifier of the second snapshot.
    pub file_b: String,
    /// Matched and evaluated elements, in name order.
    pub items: Vec<ComparisonItem>,
    /// Names present only in the first snapshot.
    pub a_only: BTreeSet<String>,
    /// Names present only in the second snapshot.
    pub b_only: BTreeSet<String>,
    /// Names present in both snapshots with incompatible kinds.
    pub mismatched: BTreeSet<String>,
}

impl Comparison {
    /// Aggregate status over all matched items.
    pub fn status(&self) -> Status {
        Status::aggregate(self.items.iter().map(|i| i.status()))
    }

    /// Write every item's plot artifacts under `out_dir`.
    pub fn ensure_plots(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for item in &self.items {
            written.extend(item.ensure_plots(out_dir)?);
        }
        Ok(written)
    }

    /// Serializable view of the whole comparison.
    pub fn report(&self) -> ComparisonReport {
        ComparisonReport {
            schema_version: REPORT_SCHEMA_VERSION,
            meta: ArtifactMeta::current(),
            file_a: self.file_a.clone(),
            file_b: self.file_b.clone(),
            status: self.status(),
            items: self
                .items
                .iter()
                .map(|i| ItemReport {
                    key: i.key.clone(),
                    status: i.status(),
                    checks: i.records(),
                })
                .collect(),
            a_only: self.a_only.iter().cloned().collect(),
            b_only: self.b_only.iter().cloned().collect(),
            mismatched: self.mismatched.iter().cloned().collect(),
        }
    }
}

/// Serializable comparison report.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    /// Schema tag.
    pub schema_version: &'static str,
    /// Producer metadata.
    pub meta: ArtifactMeta,
    /// Identifier of the first snapshot.
    pub file_a: String,
    /// Identifier of the second snapshot.
    pub file_b: String,
    /// Aggregate status.
    pub status: Status,
    /// Matched elements.
    pub items: Vec<ItemReport>,
    /// Names only in the first snapshot.
    pub a_only: Vec<String>,
    /// Names only in the second snapshot.
    pub b_only: Vec<String>,
    /// Names with incompatible kinds.
    pub mismatched: Vec<String>,
}

/// One matched element in a serialized report.
#[derive(Debug, Serialize)]
pub struct ItemReport {
    /// Element name.
    pub key: String,
    /// Aggregate status over enabled checks.
    pub status: Status,
    /// Per-check summaries.
    pub checks: Vec<CheckRecord>,
}
