//! Two-stage vocabulary lookup.
//!
//! The local table maps strings found in ClinVar to ontology labels; the
//! global table maps those labels (and some raw strings) to CURIEs. Both are
//! loaded once and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use clinyx_common::{ClinyxError, Result};

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    local: HashMap<String, String>,
    global: HashMap<String, String>,
}

impl Vocabulary {
    pub fn new(local: HashMap<String, String>, global: HashMap<String, String>) -> Self {
        Self { local, global }
    }

    /// Load the local and global tables from YAML mappings.
    pub fn from_yaml_files(local: impl AsRef<Path>, global: impl AsRef<Path>) -> Result<Self> {
        let local: HashMap<String, String> =
            serde_yaml::from_reader(std::fs::File::open(local.as_ref())?)?;
        let global: HashMap<String, String> =
            serde_yaml::from_reader(std::fs::File::open(global.as_ref())?)?;
        info!(local = local.len(), global = global.len(), "Translation tables loaded");
        Ok(Self::new(local, global))
    }

    /// `global(local(x))`, else `local(x)`, else `global(x)`, else `x`.
    ///
    /// Never fails; an unmapped label is warned about and returned as-is.
    pub fn resolve(&self, label: &str) -> String {
        if let Some(local) = self.local.get(label) {
            if let Some(term) = self.global.get(local) {
                return term.clone();
            }
            warn!(label, local = local.as_str(), "Local translation but no global term");
            return local.clone();
        }
        if let Some(term) = self.global.get(label) {
            return term.clone();
        }
        warn!(label, "No mapping for label");
        label.to_string()
    }

    /// Strict global lookup for the fixed terms the ingest depends on.
    pub fn term(&self, key: &str) -> Result<&str> {
        self.global
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ClinyxError::MissingTerm(key.to_string()))
    }

    /// The raw local mapping of a source string.
    pub fn local(&self, label: &str) -> Option<&str> {
        self.local.get(label).map(String::as_str)
    }
}
