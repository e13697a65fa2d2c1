//! YAML configuration for per-element check selection.
//!
//! Configuration maps glob-style name patterns to check tables. For every
//! compared element the most specific matching pattern wins per check kind,
//! an explicit `null` entry disables the check, and check kinds left unset
//! by every matching pattern run at their built-in defaults.
//!
//! ```yaml
//! checks:
//!   "*":
//!     Chi2Test: {threshold: 0.01}
//!     KolmogorovTest: {threshold: 0.68}
//!   "tracking/*":
//!     KolmogorovTest: null
//!     ResidualCheck: {threshold: 2.0}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hd_checks::{CheckParams, CHECK_KINDS};
use hd_core::Result;

/// Per-pattern table: check kind name to parameters, `None` disables.
pub type CheckTable = BTreeMap<String, Option<CheckParams>>;

/// Comparison configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name pattern to check table.
    pub checks: BTreeMap<String, CheckTable>,
}

impl Default for Config {
    fn default() -> Self {
        let mut table = CheckTable::new();
        for kind in CHECK_KINDS {
            table.insert(kind.to_string(), Some(CheckParams::default()));
        }
        let mut checks = BTreeMap::new();
        checks.insert("*".to_string(), table);
        Config { checks }
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Resolve the check table for a named element.
    ///
    /// Returns one `(kind, params)` pair per registered kind, in registry
    /// order. For every kind the matching pattern with the most literal
    /// characters decides; kinds set in no matching pattern run at their
    /// built-in defaults. An explicit `null` entry disables the kind
    /// (`None` params).
    pub fn checks_for(&self, name: &str) -> Vec<(String, Option<CheckParams>)> {
        // Matching patterns, most specific first. Specificity counts the
        // literal (non-wildcard) characters; ties break lexicographically.
        let mut matching: Vec<(&String, &CheckTable)> = self
            .checks
            .iter()
            .filter(|(pattern, _)| wildcard_match(pattern, name))
            .collect();
        matching.sort_by(|(pa, _), (pb, _)| {
            specificity(pb)
                .cmp(&specificity(pa))
                .then_with(|| pa.cmp(pb))
        });

        CHECK_KINDS
            .iter()
            .map(|kind| {
                let params = matching
                    .iter()
                    .find_map(|(_, table)| table.get(*kind))
                    .cloned()
                    .unwrap_or_else(|| Some(CheckParams::default()));
                (kind.to_string(), params)
            })
            .collect()
    }
}

fn specificity(pattern: &str) -> usize {
    pattern.chars().filter(|c| *c != '*').count()
}

/// Glob match with `*` as the only wildcard, matching any run of characters.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let s: Vec<char> = name.chars().collect();
    let (mut pi, mut si) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while si < s.len() {
        if pi < p.len() && p[pi] != '*' && p[pi] == s[si] {
            pi += 1;
            si += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = si;
            pi += 1;
        } else if let Some(sp) = star {
            pi = sp + 1;
            mark += 1;
            si = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
