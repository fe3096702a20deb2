//! clinyx-ingestion — ClinVar release → evidence statements.
//! - Streaming `ClinVarSet` reader over the (gzipped) release XML
//! - Record model builder with variant type inference
//! - Variant, gene and disease statements
//! - Per-submission evidence, provenance and sibling links
//! - Atomic publication of the statement set

pub mod builder;
pub mod models;
pub mod pipeline;
pub mod review;
pub mod sources;
pub mod statements;
pub mod submissions;
pub mod xml;

pub use builder::{build_record, BuildOutcome, RejectReason};
pub use models::{Allele, ClinVarRecord, Condition, Gene, GenoVar, Genotype, Variant};
pub use pipeline::{IngestPipeline, IngestSummary};
pub use sources::gene_condition::GeneConditionMap;
