use thiserror::Error;

/// Errors raised while turning a ClinVar release into statements.
///
/// Everything except `Io`/`Yaml`/`Toml`/`Other` signals that the input no
/// longer matches the structure the ingest assumes, and aborts the run.
#[derive(Debug, Error)]
pub enum ClinyxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Not a {role} CURIE: '{token}'")]
    InvalidCurie { role: &'static str, token: String },

    #[error("Empty object for subject {subject} & predicate {predicate}")]
    EmptyObject { subject: String, predicate: String },

    #[error("No global term for '{0}'")]
    MissingTerm(String),

    #[error("{accession} UNKNOWN VARIANT SUPERTYPE / TYPE '{set_type}'")]
    UnknownVariantType { accession: String, set_type: String },

    #[error("{accession} unable to infer variant type from '{set_type}'")]
    UnresolvedVariantType { accession: String, set_type: String },

    #[error("{accession} is missing required element {path}")]
    MissingElement { accession: String, path: String },

    #[error("No sibling relation for severity difference {0}")]
    UnmappedSeverityDiff(u32),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClinyxError {
    /// Wrap a quick-xml (or any displayable) failure.
    pub fn xml(err: impl std::fmt::Display) -> Self {
        ClinyxError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClinyxError>;
