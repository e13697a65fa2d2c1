//! # hd-viz
//!
//! Diagnostic artifacts for histdrift comparison reports.
//!
//! This crate is intentionally dependency-light and focuses on emitting
//! plot-friendly JSON structures (flat arrays instead of nested objects).
//! Rendering images from these artifacts is a downstream concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};

use hd_core::Result;
use serde::Serialize;

/// Artifact provenance block shared by all artifact kinds.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    /// Emitting tool.
    pub tool: String,
    /// Tool version.
    pub tool_version: String,
}

impl ArtifactMeta {
    /// Meta block for this workspace.
    pub fn current() -> Self {
        ArtifactMeta { tool: "histdrift".to_string(), tool_version: hd_core::VERSION.to_string() }
    }
}

/// Bin-wise ratio panel (monitored / reference).
#[derive(Debug, Clone, Serialize)]
pub struct RatioPanelArtifact {
    /// Schema tag for downstream consumers.
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Item name the panel belongs to.
    pub key: String,
    /// Per-bin ratio values (NaN where the reference bin is empty).
    pub ratio: Vec<f64>,
    /// Propagated per-bin ratio errors.
    pub ratio_error: Vec<f64>,
}

impl RatioPanelArtifact {
    /// Build a ratio panel artifact.
    pub fn new(key: &str, ratio: Vec<f64>, ratio_error: Vec<f64>) -> Self {
        RatioPanelArtifact {
            schema_version: "histdrift_ratio_panel_v0".to_string(),
            meta: ArtifactMeta::current(),
            key: key.to_string(),
            ratio,
            ratio_error,
        }
    }
}

/// Bin-wise pull panel (normalized deviations).
#[derive(Debug, Clone, Serialize)]
pub struct PullPanelArtifact {
    /// Schema tag for downstream consumers.
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Item name the panel belongs to.
    pub key: String,
    /// Per-bin pulls.
    pub pulls: Vec<f64>,
    /// Threshold the pulls were judged against.
    pub threshold: f64,
}

impl PullPanelArtifact {
    /// Build a pull panel artifact.
    pub fn new(key: &str, pulls: Vec<f64>, threshold: f64) -> Self {
        PullPanelArtifact {
            schema_version: "histdrift_pull_panel_v0".to_string(),
            meta: ArtifactMeta::current(),
            key: key.to_string(),
            pulls,
            threshold,
        }
    }
}

/// Serialize `artifact` to `path` as pretty JSON unless the file already
/// exists. Returns the path when a file is present afterwards (written now
/// or earlier); idempotent, so repeated runs are safe to resume.
pub fn write_if_absent<T: Serialize>(path: &Path, artifact: &T) -> Result<PathBuf> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(artifact)?;
        std::fs::write(path, bytes)?;
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("histdrift_viz_{}_{}", std::process::id(), name));
        p
    }

    #[test]
    fn test_write_if_absent_is_idempotent() {
        let path = tmp_path("ratio.json");
        let _ = std::fs::remove_file(&path);
        let art = RatioPanelArtifact::new("tracks", vec![1.0, 1.1], vec![0.1, 0.2]);
        let written = write_if_absent(&path, &art).unwrap();
        let first = std::fs::read(&written).unwrap();
        // Second write with different content must not clobber the file.
        let other = RatioPanelArtifact::new("tracks", vec![9.0], vec![9.0]);
        write_if_absent(&path, &other).unwrap();
        let second = std::fs::read(&written).unwrap();
        assert_eq!(first, second);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_artifact_serializes() {
        let art = PullPanelArtifact::new("eff", vec![0.5, 2.0], 3.0);
        let json = serde_json::to_string(&art).unwrap();
        assert!(json.contains("histdrift_pull_panel_v0"));
        assert!(json.contains("\"threshold\":3.0"));
    }
}
