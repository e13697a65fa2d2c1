//! Snapshot objects and the ingest trait.

use std::collections::{BTreeMap, BTreeSet};

use hd_core::Result;

use crate::efficiency::EfficiencyCurve;
use crate::histogram::{Hist1, Hist2};
use crate::sample::{IntegralRange, Sample};

/// One named object as stored in a snapshot.
#[derive(Debug, Clone)]
pub enum SnapshotObject {
    /// 1-D binned histogram.
    Hist1(Hist1),
    /// 2-D binned histogram.
    Hist2(Hist2),
    /// Efficiency curve.
    Efficiency(EfficiencyCurve),
    /// Anything the comparison cannot handle; carries the source class
    /// name for diagnostics.
    Unsupported {
        /// Class/type name reported by the snapshot.
        class_name: String,
    },
}

impl SnapshotObject {
    /// Kind discriminant used for the type-mismatch rule.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapshotObject::Hist1(_) => "hist1",
            SnapshotObject::Hist2(_) => "hist2",
            SnapshotObject::Efficiency(_) => "efficiency",
            SnapshotObject::Unsupported { .. } => "unsupported",
        }
    }

    /// True when checks can run on this object.
    pub fn is_supported(&self) -> bool {
        !matches!(self, SnapshotObject::Unsupported { .. })
    }

    /// Normalize into the uniform [`Sample`] view. `None` for unsupported
    /// kinds.
    pub fn adapt(&self, range: IntegralRange) -> Option<Result<Sample>> {
        match self {
            SnapshotObject::Hist1(h) => Some(Sample::from_hist1(h, range)),
            SnapshotObject::Hist2(h) => Some(Sample::from_hist2(h, range)),
            SnapshotObject::Efficiency(e) => Some(Sample::from_efficiency(e)),
            SnapshotObject::Unsupported { .. } => None,
        }
    }
}

/// Ingest interface over one snapshot of named distributions.
///
/// The comparison core consumes snapshots exclusively through this trait;
/// whatever storage format backs it belongs to the collaborator
/// implementing it.
pub trait SampleSource {
    /// Snapshot identifier for reporting (e.g. a file path).
    fn id(&self) -> &str;

    /// All names the snapshot holds. Failing here aborts the whole run;
    /// it is the only fatal ingest condition.
    fn names(&self) -> Result<BTreeSet<String>>;

    /// Object stored under `name`, if any.
    fn get(&self, name: &str) -> Option<SnapshotObject>;
}

/// In-memory source, for tests and for collaborators that preload.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    id: String,
    objects: BTreeMap<String, SnapshotObject>,
}

impl MemorySource {
    /// Empty source with the given identifier.
    pub fn new(id: &str) -> Self {
        MemorySource { id: id.to_string(), objects: BTreeMap::new() }
    }

    /// Insert an object under `name`, replacing any previous one.
    pub fn insert(&mut self, name: &str, object: SnapshotObject) {
        self.objects.insert(name.to_string(), object);
    }
}

impl SampleSource for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn names(&self) -> Result<BTreeSet<String>> {
        Ok(self.objects.keys().cloned().collect())
    }

    fn get(&self, name: &str) -> Option<SnapshotObject> {
        self.objects.get(name).cloned()
    }
}
