//! Variant, allele and gene statements for one accepted record.

use std::collections::HashSet;

use tracing::warn;

use clinyx_common::Result;
use clinyx_kg::biolink::{GENE, SEQUENCE_VARIANT, ZYGOSITY};
use clinyx_kg::{TripleBuffer, Vocabulary};

use crate::models::{Allele, ClinVarRecord, Gene, GenoVar, Genotype, Variant};
use crate::sources::gene_condition::GeneConditionMap;

const GENE_PREFIX: &str = "NCBIGene:";
const AFFECTED_FEATURE: &str = "has_affected_feature";
const COMPOUND_HETEROZYGOTE: &str = "CompoundHeterozygote";

/// Relationships that place a variant inside exactly one gene.
const SINGLE_GENE_RELATIONS: [&str; 2] = ["within single gene", "variant in gene"];

const SV: Option<&str> = Some(SEQUENCE_VARIANT);

fn gene_curie(gene: &Gene) -> Option<String> {
    gene.id.as_deref().map(|id| format!("{GENE_PREFIX}{id}"))
}

/// Append every variant/gene statement for `record` to `buffer`.
pub fn record_statements(
    record: &ClinVarRecord,
    vocab: &Vocabulary,
    genes: &GeneConditionMap,
    buffer: &mut TripleBuffer<'_>,
) -> Result<()> {
    let genovar = &record.genovar;
    let type_ = genovar.variant_type().map(|t| vocab.resolve(t));
    describe(buffer, vocab, genovar.id(), type_.as_deref(), genovar.label())?;

    match genovar {
        GenoVar::Variant(variant) => variant_statements(record, variant, vocab, genes, buffer),
        GenoVar::Genotype(genotype) => genotype_statements(genotype, vocab, buffer),
    }
}

/// Type, taxon and label of a variant-like node.
fn describe(
    buffer: &mut TripleBuffer<'_>,
    vocab: &Vocabulary,
    id: &str,
    type_: Option<&str>,
    label: Option<&str>,
) -> Result<()> {
    if let Some(type_) = type_ {
        buffer.add_categorised(id, vocab.term("type")?, type_, SV, None)?;
    }
    buffer.add(id, vocab.term("in taxon")?, vocab.term("Homo sapiens")?)?;
    if let Some(label) = label {
        buffer.add(id, vocab.term("label")?, label)?;
    }
    Ok(())
}

fn allele_statements(allele: &Allele, vocab: &Vocabulary, buffer: &mut TripleBuffer<'_>) -> Result<()> {
    let type_ = vocab.resolve(&allele.variant_type);
    describe(buffer, vocab, &allele.id, Some(&type_), allele.label.as_deref())?;

    let xref = vocab.term("database_cross_reference")?;
    for dbsnp in &allele.dbsnps {
        buffer.add_categorised(&allele.id, xref, dbsnp, SV, SV)?;
    }
    let synonym = vocab.term("has_exact_synonym")?;
    for syn in &allele.synonyms {
        buffer.add_categorised(&allele.id, synonym, syn, SV, SV)?;
    }
    Ok(())
}

fn variant_statements(
    record: &ClinVarRecord,
    variant: &Variant,
    vocab: &Vocabulary,
    genes: &GeneConditionMap,
    buffer: &mut TripleBuffer<'_>,
) -> Result<()> {
    if variant.alleles.len() > 1 {
        let has_part = vocab.term("has_variant_part")?;
        for allele in &variant.alleles {
            buffer.add_categorised(&variant.id, has_part, &allele.id, SV, SV)?;
        }
    }
    for allele in &variant.alleles {
        allele_statements(allele, vocab, buffer)?;
    }

    let pairs: Vec<(&Allele, &Gene)> = variant
        .alleles
        .iter()
        .flat_map(|a| a.genes.iter().map(move |g| (a, g)))
        .collect();
    let all_generic = pairs
        .iter()
        .all(|(_, g)| vocab.local(&g.association_to_allele) == Some(AFFECTED_FEATURE));
    let part_of = vocab.term("part_of")?;

    if !all_generic {
        for (allele, gene) in &pairs {
            let Some(gene_id) = gene_curie(gene) else {
                warn!(accession = %record.accession, allele = %allele.id, "Gene without an id skipped");
                continue;
            };
            buffer.add_categorised(&allele.id, part_of, &gene_id, SV, Some(GENE))?;
        }
        return Ok(());
    }

    // A gene is affected only when the record is (likely) pathogenic and one
    // of its conditions is curated for that gene; otherwise the variant is
    // merely part of it.
    let pathogenic = [
        vocab.term("pathogenic_for_condition")?,
        vocab.term("likely_pathogenic_for_condition")?,
    ];
    let is_pathogenic = record
        .significance
        .as_deref()
        .is_some_and(|s| pathogenic.contains(&s));

    for (allele, gene) in &pairs {
        let (Some(gene_id), Some(raw_id)) = (gene_curie(gene), gene.id.as_deref()) else {
            warn!(accession = %record.accession, allele = %allele.id, "Gene without an id skipped");
            continue;
        };
        let affected = is_pathogenic
            && record
                .conditions
                .iter()
                .filter_map(|c| c.medgen_id.as_deref())
                .any(|medgen| genes.contains(raw_id, medgen));
        if affected {
            let relation = vocab.resolve(&gene.association_to_allele);
            buffer.add_categorised(&variant.id, &relation, &gene_id, SV, Some(GENE))?;
        } else {
            buffer.add_categorised(&variant.id, part_of, &gene_id, SV, Some(GENE))?;
        }
    }
    Ok(())
}

fn genotype_statements(genotype: &Genotype, vocab: &Vocabulary, buffer: &mut TripleBuffer<'_>) -> Result<()> {
    let has_part = vocab.term("has_variant_part")?;
    let mut relations: Vec<&str> = Vec::new();
    let mut gene_ids: HashSet<Option<&str>> = HashSet::new();

    for variant in &genotype.variants {
        buffer.add_categorised(&genotype.id, has_part, &variant.id, SV, SV)?;
        let type_ = variant.variant_type.as_deref().map(|t| vocab.resolve(t));
        describe(buffer, vocab, &variant.id, type_.as_deref(), variant.label.as_deref())?;
        if variant.alleles.len() > 1 {
            for allele in &variant.alleles {
                buffer.add_categorised(&variant.id, has_part, &allele.id, SV, SV)?;
            }
        }

        for allele in &variant.alleles {
            allele_statements(allele, vocab, buffer)?;
            for gene in &allele.genes {
                relations.push(&gene.association_to_allele);
                gene_ids.insert(gene.id.as_deref());
                let Some(gene_id) = gene_curie(gene) else {
                    warn!(genotype = %genotype.id, allele = %allele.id, "Gene without an id skipped");
                    continue;
                };
                let relation = vocab.resolve(&gene.association_to_allele);
                buffer.add_categorised(&allele.id, &relation, &gene_id, SV, Some(GENE))?;
            }
        }
    }

    if genotype.variant_type.as_deref() == Some(COMPOUND_HETEROZYGOTE) {
        buffer.add_categorised(
            &genotype.id,
            vocab.term("has_zygosity")?,
            vocab.term("compound heterozygous")?,
            SV,
            Some(ZYGOSITY),
        )?;
    }

    let single_gene = relations.iter().all(|r| SINGLE_GENE_RELATIONS.contains(r));
    if let (true, [Some(gene)]) = (single_gene, gene_ids.into_iter().collect::<Vec<_>>().as_slice()) {
        buffer.add_categorised(
            &genotype.id,
            vocab.term("has_affected_feature")?,
            &format!("{GENE_PREFIX}{gene}"),
            SV,
            Some(GENE),
        )?;
    }
    Ok(())
}
