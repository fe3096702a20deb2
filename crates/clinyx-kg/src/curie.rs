//! CURIE prefix registry.
//!
//! Loaded once from `curie_map.yaml` and never mutated afterwards. The
//! anonymous-node prefix `_` is always present; how it expands is decided by
//! [`BlankNodeMode`].

use std::collections::HashMap;
use std::path::Path;

use clinyx_common::Result;

/// Prefix used for anonymous (blank) nodes.
pub const BLANK_PREFIX: &str = "_";

/// Skolem base for anonymous nodes when they are made resolvable.
pub const SKOLEM_BASE: &str = "https://monarchinitiative.org/.well-known/genid/";

/// How `_:x` identifiers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankNodeMode {
    /// `<https://monarchinitiative.org/.well-known/genid/x>`
    #[default]
    Skolemize,
    /// `_:x`
    Plain,
}

impl From<bool> for BlankNodeMode {
    fn from(skolemize: bool) -> Self {
        if skolemize { BlankNodeMode::Skolemize } else { BlankNodeMode::Plain }
    }
}

#[derive(Debug, Clone)]
pub struct CurieMap {
    prefixes: HashMap<String, String>,
    blank_nodes: BlankNodeMode,
}

impl CurieMap {
    pub fn new(mut prefixes: HashMap<String, String>, blank_nodes: BlankNodeMode) -> Self {
        let base = match blank_nodes {
            BlankNodeMode::Skolemize => SKOLEM_BASE,
            BlankNodeMode::Plain => "_:",
        };
        prefixes.insert(BLANK_PREFIX.to_string(), base.to_string());
        Self { prefixes, blank_nodes }
    }

    /// Read a `prefix: base-iri` YAML mapping.
    pub fn from_yaml(path: impl AsRef<Path>, blank_nodes: BlankNodeMode) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let prefixes: HashMap<String, String> = serde_yaml::from_reader(file)?;
        Ok(Self::new(prefixes, blank_nodes))
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    pub fn base(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn blank_nodes(&self) -> BlankNodeMode {
        self.blank_nodes
    }

    /// Render `prefix` + `local` as an N-Triples term: `<iri>`, or `_:local`
    /// for plain anonymous nodes. `None` for unregistered prefixes.
    pub fn render(&self, prefix: &str, local: &str) -> Option<String> {
        let base = self.base(prefix)?;
        let local = local.trim();
        if prefix == BLANK_PREFIX && self.blank_nodes == BlankNodeMode::Plain {
            Some(format!("{base}{local}"))
        } else {
            Some(format!("<{base}{local}>"))
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
