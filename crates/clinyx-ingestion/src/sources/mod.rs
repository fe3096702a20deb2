//! Input readers.

pub mod clinvar;
pub mod gene_condition;
