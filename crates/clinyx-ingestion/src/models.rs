//! In-memory ClinVar record model.
//!
//! Built fresh for each `ClinVarSet` and dropped once its statements have
//! been merged.

use chrono::NaiveDate;

/// A gene related to an allele through a `MeasureRelationship`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    /// NCBI gene id; ClinVar sometimes omits it
    pub id: Option<String>,
    /// Raw relationship type, e.g. "within single gene"
    pub association_to_allele: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allele {
    pub id: String,
    pub label: Option<String>,
    pub variant_type: String,
    pub synonyms: Vec<String>,
    /// `dbSNP:<id>` cross-references
    pub dbsnps: Vec<String>,
    pub genes: Vec<Gene>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variant {
    pub id: String,
    pub label: Option<String>,
    pub variant_type: Option<String>,
    pub alleles: Vec<Allele>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Genotype {
    pub id: String,
    pub label: Option<String>,
    pub variant_type: Option<String>,
    pub variants: Vec<Variant>,
}

/// What a reference assertion is about.
#[derive(Debug, Clone, PartialEq)]
pub enum GenoVar {
    Variant(Variant),
    Genotype(Genotype),
}

impl GenoVar {
    pub fn id(&self) -> &str {
        match self {
            GenoVar::Variant(v) => &v.id,
            GenoVar::Genotype(g) => &g.id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            GenoVar::Variant(v) => v.label.as_deref(),
            GenoVar::Genotype(g) => g.label.as_deref(),
        }
    }

    pub fn variant_type(&self) -> Option<&str> {
        match self {
            GenoVar::Variant(v) => v.variant_type.as_deref(),
            GenoVar::Genotype(g) => g.variant_type.as_deref(),
        }
    }

    /// Identifier, type and at least one member are all present.
    pub fn is_complete(&self) -> bool {
        let has_members = match self {
            GenoVar::Variant(v) => !v.alleles.is_empty(),
            GenoVar::Genotype(g) => !g.variants.is_empty(),
        };
        !self.id().is_empty() && self.variant_type().is_some() && has_members
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub id: Option<String>,
    pub label: Option<String>,
    /// CURIE prefix of `id`: OMIM, OMIMPS, ORPHA, MONDO or UMLS
    pub database: Option<String>,
    /// MedGen concept id, matched against the gene/condition map
    pub medgen_id: Option<String>,
}

impl Condition {
    pub fn is_usable(&self) -> bool {
        self.id.is_some() && self.database.is_some()
    }

    /// `<database>:<id>`, or the last two `:` parts when the id is already
    /// prefixed (MONDO ids arrive as `MONDO:0000001`).
    pub fn curie(&self) -> Option<String> {
        let (id, database) = (self.id.as_deref()?, self.database.as_deref()?);
        let parts: Vec<&str> = id.split(':').collect();
        if parts.len() == 1 {
            Some(format!("{database}:{id}"))
        } else {
            Some(parts[parts.len() - 2..].join(":"))
        }
    }
}

/// The reference assertion of one `ClinVarSet`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinVarRecord {
    pub id: String,
    pub accession: String,
    pub created: Option<NaiveDate>,
    pub updated: Option<NaiveDate>,
    pub genovar: GenoVar,
    /// Resolved clinical significance
    pub significance: Option<String>,
    pub review_status: Option<String>,
    pub conditions: Vec<Condition>,
}

impl ClinVarRecord {
    pub fn usable_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| c.is_usable())
    }
}
