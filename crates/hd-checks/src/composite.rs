//! Composite combinator requiring several checks to agree.

use std::path::{Path, PathBuf};

use hd_core::{Error, Memo, Result};

use crate::framework::CompatCheck;

/// Combines sub-checks: applicable iff all are applicable, valid iff all
/// are valid, disabled iff any is disabled. Used to require multiple
/// independent criteria to agree before declaring success.
pub struct CompositeCheck {
    name: String,
    children: Vec<Box<dyn CompatCheck>>,
    applicable: Memo<bool>,
    valid: Memo<bool>,
}

impl CompositeCheck {
    /// Combine `children` (at least one).
    pub fn new(children: Vec<Box<dyn CompatCheck>>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::Validation("composite check needs at least one child".into()));
        }
        let name = format!(
            "Composite({})",
            children.iter().map(|c| c.name().to_string()).collect::<Vec<_>>().join(", ")
        );
        Ok(CompositeCheck { name, children, applicable: Memo::new(), valid: Memo::new() })
    }
}

impl CompatCheck for CompositeCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_applicable(&self) -> bool {
        *self.applicable.get_or_init(|| self.children.iter().all(|c| c.is_applicable()))
    }

    fn is_valid(&self) -> Result<bool> {
        if !self.is_applicable() {
            return Err(Error::IllegalState(format!(
                "{} not applicable, cannot check validity",
                self.name
            )));
        }
        if let Some(v) = self.valid.get() {
            return Ok(*v);
        }
        let mut all = true;
        for c in &self.children {
            all = all && c.is_valid()?;
        }
        Ok(*self.valid.get_or_init(|| all))
    }

    fn label(&self) -> String {
        self.children.iter().map(|c| c.label()).collect::<Vec<_>>().join("; ")
    }

    fn is_disabled(&self) -> bool {
        self.children.iter().any(|c| c.is_disabled())
    }

    fn ensure_plot(&self, out_dir: &Path, key: &str) -> Result<Option<PathBuf>> {
        // First child artifact wins; children stay individually idempotent.
        for c in &self.children {
            if let Some(path) = c.ensure_plot(out_dir, key)? {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}
