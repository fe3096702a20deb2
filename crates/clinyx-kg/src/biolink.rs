//! Biolink categories attached to subjects and objects.

pub const CATEGORY: &str = "biolink:category";

pub const ASSOCIATION: &str = "biolink:Association";
pub const DISEASE: &str = "biolink:Disease";
pub const EVIDENCE_TYPE: &str = "biolink:EvidenceType";
pub const GENE: &str = "biolink:Gene";
pub const INFORMATION_CONTENT_ENTITY: &str = "biolink:InformationContentEntity";
pub const ONTOLOGY_CLASS: &str = "biolink:OntologyClass";
pub const PROCEDURE: &str = "biolink:Procedure";
pub const PROVIDER: &str = "biolink:Provider";
pub const PUBLICATION: &str = "biolink:Publication";
pub const SEQUENCE_VARIANT: &str = "biolink:SequenceVariant";
pub const ZYGOSITY: &str = "biolink:Zygosity";
