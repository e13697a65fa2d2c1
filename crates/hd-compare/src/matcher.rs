//! Name-based pairing of two snapshots and check evaluation.

use std::sync::Arc;

use hd_checks::build_check;
use hd_core::Result;
use hd_sample::{IntegralRange, SampleSource, SnapshotObject};

use crate::config::Config;
use crate::result::{Comparison, ComparisonItem};

/// Compare two snapshots element by element.
///
/// Elements are paired strictly by name. A failure to list either
/// snapshot's names is fatal; every per-element problem (kind mismatch,
/// unsupported kind, adaptation failure) is logged and confined to that
/// element. Checks are evaluated eagerly, so the returned comparison holds
/// settled results.
pub fn compare(
    a: &dyn SampleSource,
    b: &dyn SampleSource,
    config: &Config,
) -> Result<Comparison> {
    let names_a = a.names()?;
    let names_b = b.names()?;

    let mut a_only: std::collections::BTreeSet<String> =
        names_a.difference(&names_b).cloned().collect();
    let mut b_only: std::collections::BTreeSet<String> =
        names_b.difference(&names_a).cloned().collect();
    let mut mismatched = std::collections::BTreeSet::new();

    let common: Vec<&String> = names_a.intersection(&names_b).collect();
    log::info!(
        "{} common elements between {} and {}",
        common.len(),
        a.id(),
        b.id()
    );

    let range = IntegralRange::default();
    let mut items = Vec::new();

    for key in common {
        let (Some(obj_a), Some(obj_b)) = (a.get(key), b.get(key)) else {
            log::warn!("{}: listed but not retrievable from both snapshots", key);
            continue;
        };

        if obj_a.kind() != obj_b.kind() {
            log::warn!(
                "{}: kind mismatch ({} vs {}), treating as removed and newly added",
                key,
                obj_a.kind(),
                obj_b.kind()
            );
            mismatched.insert(key.clone());
            a_only.insert(key.clone());
            b_only.insert(key.clone());
            continue;
        }

        if let SnapshotObject::Unsupported { class_name } = &obj_a {
            log::warn!("{}: unable to handle objects of class {}", key, class_name);
            continue;
        }

        let sample_a = match obj_a.adapt(range) {
            Some(Ok(s)) => Arc::new(s),
            Some(Err(e)) => {
                log::warn!("{}: skipping, {}", key, e);
                continue;
            }
            None => continue,
        };
        let sample_b = match obj_b.adapt(range) {
            Some(Ok(s)) => Arc::new(s),
            Some(Err(e)) => {
                log::warn!("{}: skipping, {}", key, e);
                continue;
            }
            None => continue,
        };

        let mut checks = Vec::new();
        for (kind, params) in config.checks_for(key) {
            let disabled = params.is_none();
            let params = params.unwrap_or_default();
            match build_check(&kind, &sample_a, &sample_b, &params, disabled) {
                Some(check) => {
                    // Settle the memoized result now; samples never change
                    // after this point.
                    let status = check.status();
                    log::debug!("{}: {} -> {:?}", key, check.name(), status);
                    checks.push(check);
                }
                None => log::warn!("{}: unknown check kind {:?} in configuration", key, kind),
            }
        }

        items.push(ComparisonItem {
            key: key.clone(),
            sample_a,
            sample_b,
            checks,
        });
    }

    log::info!("{} elements only in {}", a_only.len(), a.id());
    log::info!("{} elements only in {}", b_only.len(), b.id());

    Ok(Comparison {
        file_a: a.id().to_string(),
        file_b: b.id().to_string(),
        items,
        a_only,
        b_only,
        mismatched,
    })
}
