//! Run configuration for a ClinVar ingest.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable configuration. Values are usually overridden from the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Complete ingest configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Where the release and the gene/condition map live
    #[serde(default)]
    pub input: InputConfig,

    /// Translation tables and namespace registry
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,
}

// ── Input ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the raw downloads
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,

    /// Gzipped (or plain) release XML
    #[serde(default = "default_release_file")]
    pub filename: String,

    /// Tab-delimited gene → condition source id map
    #[serde(default = "default_mapfile")]
    pub mapfile: String,
}

fn default_input_dir() -> PathBuf { PathBuf::from("raw/clinvar") }
fn default_release_file() -> String { "ClinVarFullRelease_00-latest.xml.gz".to_string() }
fn default_mapfile() -> String { "gene_condition_source_id".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            filename: default_release_file(),
            mapfile: default_mapfile(),
        }
    }
}

// ── Vocabulary ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Source strings → ontology labels
    #[serde(default = "default_local_tt")]
    pub local: PathBuf,

    /// Ontology labels → CURIEs
    #[serde(default = "default_global_tt")]
    pub global: PathBuf,

    /// CURIE prefix → base IRI
    #[serde(default = "default_curie_map")]
    pub curie_map: PathBuf,
}

fn default_local_tt() -> PathBuf { PathBuf::from("translationtable/clinvar.yaml") }
fn default_global_tt() -> PathBuf { PathBuf::from("translationtable/GLOBAL_TERMS.yaml") }
fn default_curie_map() -> PathBuf { PathBuf::from("translationtable/curie_map.yaml") }

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            local: default_local_tt(),
            global: default_global_tt(),
            curie_map: default_curie_map(),
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory to write into
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// N-Triples file name, also used for the dataset IRI
    #[serde(default = "default_output_file")]
    pub filename: String,

    /// Expand `_:` nodes to resolvable genid IRIs instead of plain blank nodes
    #[serde(default = "default_true")]
    pub skolemize: bool,

    /// Also emit the review status → star score statements
    #[serde(default)]
    pub review_scores: bool,
}

fn default_destination() -> PathBuf { PathBuf::from("out") }
fn default_output_file() -> String { "clinvar.nt".to_string() }
fn default_true() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            filename: default_output_file(),
            skolemize: true,
            review_scores: false,
        }
    }
}

// ── Helper Methods ───────────────────────────────────────────────────────────

impl IngestConfig {
    /// Load from the file named by `CLINYX_CONFIG`, else `clinyx.toml`,
    /// else fall back to defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CLINYX_CONFIG")
            .unwrap_or_else(|_| "clinyx.toml".to_string());

        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        Self::from_toml(path)
    }

    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn input_path(&self) -> PathBuf {
        self.input.dir.join(&self.input.filename)
    }

    pub fn mapfile_path(&self) -> PathBuf {
        self.input.dir.join(&self.input.mapfile)
    }

    /// Output is written here first and renamed once complete.
    pub fn partial_output_path(&self) -> PathBuf {
        self.output
            .destination
            .join(format!("TMP_{}_PART", self.output.filename))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.destination.join(&self.output.filename)
    }

    /// `ClinVarFullRelease_00-latest.xml.gz` → `<destination>/ClinVarFullRelease_00-latest_reject.xml`
    pub fn reject_path(&self) -> PathBuf {
        let name = &self.input.filename;
        let basename = name
            .strip_suffix(".xml.gz")
            .or_else(|| name.strip_suffix(".xml"))
            .unwrap_or(name);
        self.output.destination.join(format!("{basename}_reject.xml"))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.input.filename, "ClinVarFullRelease_00-latest.xml.gz");
        assert!(config.output.skolemize);
        assert!(!config.output.review_scores);
    }

    #[test]
    fn test_derived_paths() {
        let config = IngestConfig::default();
        assert_eq!(config.output_path(), PathBuf::from("out/clinvar.nt"));
        assert_eq!(config.partial_output_path(), PathBuf::from("out/TMP_clinvar.nt_PART"));
        assert_eq!(
            config.reject_path(),
            PathBuf::from("out/ClinVarFullRelease_00-latest_reject.xml")
        );
        assert_eq!(
            config.input_path(),
            PathBuf::from("raw/clinvar/ClinVarFullRelease_00-latest.xml.gz")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinyx.toml");
        std::fs::write(&path, "[output]\nfilename = \"test.nt\"\nskolemize = false\n").unwrap();

        let config = IngestConfig::from_toml(&path).unwrap();
        assert_eq!(config.output.filename, "test.nt");
        assert!(!config.output.skolemize);
        assert_eq!(config.input.mapfile, "gene_condition_source_id");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = IngestConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: IngestConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.output.filename, parsed.output.filename);
        assert_eq!(config.vocabulary.global, parsed.vocabulary.global);
    }
}
