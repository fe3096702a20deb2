//! ClinVar `gene_condition_source_id` map.
//!
//! Tab-delimited with one header row. Column 0 is the NCBI gene id and
//! column 3 the condition's MedGen concept id. Used to decide whether a gene
//! is actually affected by a variant or merely overlapped by it.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use clinyx_common::Result;

const GENE_COLUMN: usize = 0;
const CONCEPT_COLUMN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct GeneConditionMap {
    conditions: HashMap<String, HashSet<String>>,
}

impl GeneConditionMap {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open gene/condition map {}", path.display()))?;
        let map = Self::from_reader(BufReader::new(file))?;
        info!(genes = map.len(), path = %path.display(), "Loaded gene/condition map");
        Ok(map)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut conditions: HashMap<String, HashSet<String>> = HashMap::new();
        for line in reader.lines().skip(1) {
            let line = line?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() <= CONCEPT_COLUMN {
                continue;
            }
            conditions
                .entry(fields[GENE_COLUMN].to_string())
                .or_default()
                .insert(fields[CONCEPT_COLUMN].to_string());
        }
        Ok(Self { conditions })
    }

    pub fn from_tsv(tsv: &str) -> Result<Self> {
        Self::from_reader(tsv.as_bytes())
    }

    /// True when `concept_id` is a curated condition of `gene`.
    pub fn contains(&self, gene: &str, concept_id: &str) -> bool {
        self.conditions
            .get(gene)
            .is_some_and(|set| set.contains(concept_id))
    }

    pub fn conditions_for(&self, gene: &str) -> Option<&HashSet<String>> {
        self.conditions.get(gene)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
