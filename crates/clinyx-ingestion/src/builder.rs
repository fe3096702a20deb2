//! Record model builder: one `ClinVarSet` element → [`ClinVarRecord`].
//!
//! Structural surprises (unknown variant-set type, missing identifiers) are
//! errors and stop the run. Under-specified records are returned as
//! [`BuildOutcome::Rejected`] and only counted.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use clinyx_common::{ClinyxError, Result};
use clinyx_kg::Vocabulary;

use crate::models::{Allele, ClinVarRecord, Condition, Gene, GenoVar, Genotype, Variant};
use crate::xml::XmlElement;

const VARIANT_ID_PREFIX: &str = "ClinVarVariant:";
const PREFERRED_NAME: &str = r#"Name/ElementValue[@Type="Preferred"]"#;

/// `MeasureSet/@Type` values used as-is. `Variant` is inferred from its
/// measure instead.
pub const HAPLOTYPE_TYPES: [&str; 4] = [
    "Haplotype",
    "Phase unknown",
    "Distinct chromosomes",
    "Haplotype, single variant",
];
const INFERRED_TYPE: &str = "Variant";

fn synonym_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^HGVS").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Variant/genotype lacks an id, a type or any members
    IncompleteGenoVar,
    /// No condition has both an identifier and a database
    NoUsableCondition,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::IncompleteGenoVar => "incomplete variant",
            RejectReason::NoUsableCondition => "no usable condition",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Accepted(ClinVarRecord),
    Rejected { accession: String, reason: RejectReason },
}

fn missing(accession: &str, path: &str) -> ClinyxError {
    ClinyxError::MissingElement { accession: accession.to_string(), path: path.to_string() }
}

fn parse_date(accession: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(accession, raw, error = %e, "Unparsable date");
            None
        }
    }
}

/// Build the record for one `ClinVarSet`.
pub fn build_record(set: &XmlElement, vocab: &Vocabulary) -> Result<BuildOutcome> {
    let set_id = set.attr("ID").unwrap_or_default();
    if set.find_text("RecordStatus") != Some("current") {
        warn!(set = set_id, "ClinVarSet is not current");
    }

    let rcv = set
        .find("ReferenceClinVarAssertion")
        .ok_or_else(|| missing(set_id, "ReferenceClinVarAssertion"))?;
    let accession = rcv
        .find("ClinVarAccession")
        .and_then(|a| a.attr("Acc"))
        .ok_or_else(|| missing(set_id, "ReferenceClinVarAssertion/ClinVarAccession/@Acc"))?;
    if rcv.find_text("RecordStatus") != Some("current") {
        warn!(accession, "Reference assertion is not current");
    }
    let record_id = rcv
        .attr("ID")
        .ok_or_else(|| missing(accession, "ReferenceClinVarAssertion/@ID"))?;

    let significance = rcv
        .find_text("ClinicalSignificance/Description")
        .map(|d| vocab.resolve(d));
    let review_status = rcv
        .find_text("ClinicalSignificance/ReviewStatus")
        .map(str::to_string);

    let genovar = match rcv.find("MeasureSet") {
        Some(measure_set) => GenoVar::Variant(process_measure_set(measure_set, accession)?),
        None => {
            let genotype_set = rcv
                .find("GenotypeSet")
                .ok_or_else(|| missing(accession, "MeasureSet | GenotypeSet"))?;
            GenoVar::Genotype(process_genotype_set(genotype_set, accession)?)
        }
    };

    let conditions = rcv
        .find_all(r#"TraitSet/Trait[@Type="Disease"]"#)
        .into_iter()
        .map(|t| process_trait(t, accession))
        .collect();

    let record = ClinVarRecord {
        id: record_id.to_string(),
        accession: accession.to_string(),
        created: parse_date(accession, rcv.attr("DateCreated")),
        updated: parse_date(accession, rcv.attr("DateLastUpdated")),
        genovar,
        significance,
        review_status,
        conditions,
    };

    let reason = if !record.genovar.is_complete() {
        Some(RejectReason::IncompleteGenoVar)
    } else if record.usable_conditions().next().is_none() {
        Some(RejectReason::NoUsableCondition)
    } else {
        None
    };
    Ok(match reason {
        Some(reason) => BuildOutcome::Rejected { accession: record.accession, reason },
        None => BuildOutcome::Accepted(record),
    })
}

// ── Variants ─────────────────────────────────────────────────────────────────

/// One `MeasureSet` → [`Variant`], inferring the type from a single measure.
pub fn process_measure_set(measure_set: &XmlElement, accession: &str) -> Result<Variant> {
    let id = measure_set
        .attr("ID")
        .ok_or_else(|| missing(accession, "MeasureSet/@ID"))?;
    let set_type = measure_set.attr("Type").unwrap_or_default();

    let mut variant = Variant {
        id: format!("{VARIANT_ID_PREFIX}{id}"),
        label: measure_set.find_text(PREFERRED_NAME).map(str::to_string),
        ..Default::default()
    };

    if HAPLOTYPE_TYPES.contains(&set_type) {
        variant.variant_type = Some(set_type.to_string());
    } else if set_type != INFERRED_TYPE {
        return Err(ClinyxError::UnknownVariantType {
            accession: accession.to_string(),
            set_type: set_type.to_string(),
        });
    }

    for measure in measure_set.find_all("Measure") {
        variant.alleles.push(process_measure(measure, accession)?);
    }

    if let [allele] = variant.alleles.as_mut_slice() {
        allele.id = variant.id.clone();
        variant.variant_type = Some(allele.variant_type.clone());
        if variant.label.is_none() {
            variant.label = allele.label.clone();
        }
    }

    if variant.variant_type.is_none() {
        return Err(ClinyxError::UnresolvedVariantType {
            accession: accession.to_string(),
            set_type: set_type.to_string(),
        });
    }
    Ok(variant)
}

fn process_measure(measure: &XmlElement, accession: &str) -> Result<Allele> {
    let id = measure
        .attr("ID")
        .ok_or_else(|| missing(accession, "Measure/@ID"))?;
    let variant_type = measure
        .attr("Type")
        .map(str::trim)
        .ok_or_else(|| missing(accession, "Measure/@Type"))?;

    let mut allele = Allele {
        id: format!("{VARIANT_ID_PREFIX}{id}"),
        label: measure.find_text(PREFERRED_NAME).map(str::to_string),
        variant_type: variant_type.to_string(),
        ..Default::default()
    };

    for attribute in measure.find_all("AttributeSet/Attribute[@Type]") {
        let is_synonym = attribute
            .attr("Type")
            .is_some_and(|t| synonym_type_re().is_match(t));
        if let (true, Some(text)) = (is_synonym, attribute.text()) {
            allele.synonyms.push(text.to_string());
        }
    }

    for xref in measure.find_all(r#"XRef[@DB="dbSNP"]"#) {
        if let Some(rs) = xref.attr("ID") {
            allele.dbsnps.push(format!("dbSNP:{rs}"));
            allele.synonyms.push(format!("rs{rs}"));
        }
    }

    for relationship in measure.find_all("MeasureRelationship") {
        let Some(kind) = relationship.attr("Type").map(str::trim) else {
            warn!(accession, allele = %allele.id, "MeasureRelationship without a type");
            continue;
        };
        let gene_id = relationship
            .find(r#"XRef[@DB="Gene"]"#)
            .and_then(|x| x.attr("ID"))
            .map(str::to_string);
        allele.genes.push(Gene { id: gene_id, association_to_allele: kind.to_string() });
    }

    Ok(allele)
}

/// One `GenotypeSet` → [`Genotype`]; member variants are not collapsed
/// further than their own measure sets.
fn process_genotype_set(genotype_set: &XmlElement, accession: &str) -> Result<Genotype> {
    let id = genotype_set
        .attr("ID")
        .ok_or_else(|| missing(accession, "GenotypeSet/@ID"))?;
    let variants = genotype_set
        .find_all("MeasureSet")
        .into_iter()
        .map(|ms| process_measure_set(ms, accession))
        .collect::<Result<Vec<_>>>()?;
    Ok(Genotype {
        id: format!("{VARIANT_ID_PREFIX}{id}"),
        label: genotype_set.find_text(PREFERRED_NAME).map(str::to_string),
        variant_type: genotype_set.attr("Type").map(str::to_string),
        variants,
    })
}

// ── Conditions ───────────────────────────────────────────────────────────────

fn first_xref<'e>(element: &'e XmlElement, db: &str) -> Option<&'e str> {
    element
        .find_all("XRef")
        .into_iter()
        .find(|x| x.attr("DB") == Some(db))
        .and_then(|x| x.attr("ID"))
}

/// Disease cross-reference priority: OMIM, then Orphanet, then MONDO, with
/// MedGen always captured and used as a UMLS fallback.
pub fn process_trait(disease: &XmlElement, accession: &str) -> Condition {
    let mut condition = Condition {
        label: disease.find_text(PREFERRED_NAME).map(str::to_string),
        ..Default::default()
    };

    if let Some(id) = first_xref(disease, "OMIM") {
        let db = if id.starts_with("PS") { "OMIMPS" } else { "OMIM" };
        condition.database = Some(db.to_string());
        condition.id = Some(id.to_string());
    } else if let Some(id) = first_xref(disease, "Orphanet") {
        condition.database = Some("ORPHA".to_string());
        condition.id = Some(id.to_string());
    } else if let Some(id) = first_xref(disease, "MONDO") {
        condition.database = Some("MONDO".to_string());
        condition.id = Some(id.to_string());
    }

    if let Some(medgen) = first_xref(disease, "MedGen") {
        condition.medgen_id = Some(medgen.to_string());
        if condition.database.is_none() {
            condition.database = Some("UMLS".to_string());
        }
        if condition.id.is_none() {
            condition.id = Some(medgen.to_string());
        }
    }

    if condition.database.is_none() {
        if let Some(xref) = disease.find("XRef") {
            warn!(
                accession,
                db = xref.attr("DB").unwrap_or_default(),
                id = xref.attr("ID").unwrap_or_default(),
                "Unknown disease database"
            );
        }
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::clinvar::ClinVarSetReader;
    use std::collections::HashMap;

    fn vocab() -> Vocabulary {
        Vocabulary::new(
            HashMap::from([("Pathogenic".to_string(), "pathogenic_for_condition".to_string())]),
            HashMap::from([("pathogenic_for_condition".to_string(), "GENO:0000840".to_string())]),
        )
    }

    fn parse(xml: &str) -> XmlElement {
        ClinVarSetReader::from_xml(xml).next().unwrap().unwrap()
    }

    fn clinvar_set(measure_set: &str, traits: &str) -> String {
        format!(
            r#"<ClinVarSet ID="9"><RecordStatus>current</RecordStatus>
            <ReferenceClinVarAssertion ID="100" DateCreated="2012-08-13" DateLastUpdated="not a date">
              <ClinVarAccession Acc="RCV000000100" Version="3"/>
              <RecordStatus>current</RecordStatus>
              <ClinicalSignificance>
                <ReviewStatus>criteria provided, single submitter</ReviewStatus>
                <Description>Pathogenic</Description>
              </ClinicalSignificance>
              {measure_set}
              <TraitSet Type="Disease">{traits}</TraitSet>
            </ReferenceClinVarAssertion></ClinVarSet>"#
        )
    }

    const SINGLE_MEASURE: &str = r#"
      <MeasureSet Type="Variant" ID="17000">
        <Measure Type="single nucleotide variant" ID="32000">
          <Name><ElementValue Type="Preferred">NM_000249.3(MLH1):c.1A&gt;G</ElementValue></Name>
          <AttributeSet><Attribute Type="HGVS, coding, RefSeq">NM_000249.3:c.1A&gt;G</Attribute></AttributeSet>
          <AttributeSet><Attribute Type="ProteinChange1LetterCode">M1V</Attribute></AttributeSet>
          <XRef DB="dbSNP" ID="63750955" Type="rs"/>
          <MeasureRelationship Type="within single gene">
            <XRef DB="Gene" ID="4292"/>
          </MeasureRelationship>
        </Measure>
      </MeasureSet>"#;

    const OMIM_TRAIT: &str = r#"
      <Trait Type="Disease">
        <Name><ElementValue Type="Preferred">Lynch syndrome</ElementValue></Name>
        <XRef DB="MedGen" ID="C1333990"/>
        <XRef DB="OMIM" ID="120435"/>
      </Trait>"#;

    fn accepted(outcome: BuildOutcome) -> ClinVarRecord {
        match outcome {
            BuildOutcome::Accepted(record) => record,
            other => panic!("expected an accepted record, got {other:?}"),
        }
    }

    #[test]
    fn test_single_allele_collapse() {
        let set = parse(&clinvar_set(SINGLE_MEASURE, OMIM_TRAIT));
        let record = accepted(build_record(&set, &vocab()).unwrap());
        let GenoVar::Variant(variant) = &record.genovar else { panic!("expected a variant") };
        assert_eq!(variant.id, "ClinVarVariant:17000");
        assert_eq!(variant.alleles.len(), 1);
        assert_eq!(variant.alleles[0].id, "ClinVarVariant:17000");
        assert_eq!(variant.variant_type.as_deref(), Some("single nucleotide variant"));
        assert_eq!(variant.label.as_deref(), Some("NM_000249.3(MLH1):c.1A>G"));
    }

    #[test]
    fn test_allele_fields() {
        let set = parse(&clinvar_set(SINGLE_MEASURE, OMIM_TRAIT));
        let record = accepted(build_record(&set, &vocab()).unwrap());
        let GenoVar::Variant(variant) = &record.genovar else { panic!("expected a variant") };
        let allele = &variant.alleles[0];
        assert_eq!(allele.synonyms, vec!["NM_000249.3:c.1A>G", "rs63750955"]);
        assert_eq!(allele.dbsnps, vec!["dbSNP:63750955"]);
        assert_eq!(
            allele.genes,
            vec![Gene { id: Some("4292".into()), association_to_allele: "within single gene".into() }]
        );
        assert_eq!(record.significance.as_deref(), Some("GENO:0000840"));
        assert_eq!(record.review_status.as_deref(), Some("criteria provided, single submitter"));
        assert_eq!(record.created, NaiveDate::from_ymd_opt(2012, 8, 13));
        assert_eq!(record.updated, None);
    }

    #[test]
    fn test_condition_priority() {
        let set = parse(&clinvar_set(SINGLE_MEASURE, OMIM_TRAIT));
        let record = accepted(build_record(&set, &vocab()).unwrap());
        assert_eq!(
            record.conditions,
            vec![Condition {
                id: Some("120435".into()),
                label: Some("Lynch syndrome".into()),
                database: Some("OMIM".into()),
                medgen_id: Some("C1333990".into()),
            }]
        );
    }

    #[test]
    fn test_condition_fallbacks() {
        let trait_with = |xrefs: &str| {
            let xml = format!(r#"<Trait Type="Disease">{xrefs}</Trait>"#);
            let wrapped = format!("<ClinVarSet>{xml}</ClinVarSet>");
            let set = parse(&wrapped);
            process_trait(set.find("Trait").unwrap(), "RCV1")
        };

        let ps = trait_with(r#"<XRef DB="OMIM" ID="PS120435"/>"#);
        assert_eq!(ps.database.as_deref(), Some("OMIMPS"));

        let orpha = trait_with(r#"<XRef DB="MONDO" ID="MONDO:0018630"/><XRef DB="Orphanet" ID="144"/>"#);
        assert_eq!((orpha.database.as_deref(), orpha.id.as_deref()), (Some("ORPHA"), Some("144")));

        let mondo = trait_with(r#"<XRef DB="MONDO" ID="MONDO:0018630"/>"#);
        assert_eq!(mondo.curie().as_deref(), Some("MONDO:0018630"));

        let umls = trait_with(r#"<XRef DB="MedGen" ID="C0009405"/>"#);
        assert_eq!(umls.curie().as_deref(), Some("UMLS:C0009405"));
        assert_eq!(umls.medgen_id.as_deref(), Some("C0009405"));

        let unknown = trait_with(r#"<XRef DB="EFO" ID="EFO_0000001"/>"#);
        assert!(!unknown.is_usable());
    }

    #[test]
    fn test_rejects_when_no_condition_has_database() {
        let traits = r#"<Trait Type="Disease">
            <Name><ElementValue Type="Preferred">not specified</ElementValue></Name>
            <XRef DB="Human Phenotype Ontology" ID="HP:0000001"/>
          </Trait>"#;
        let set = parse(&clinvar_set(SINGLE_MEASURE, traits));
        assert_eq!(
            build_record(&set, &vocab()).unwrap(),
            BuildOutcome::Rejected {
                accession: "RCV000000100".into(),
                reason: RejectReason::NoUsableCondition,
            }
        );
    }

    #[test]
    fn test_rejects_empty_haplotype() {
        let measure_set = r#"<MeasureSet Type="Haplotype" ID="17001"/>"#;
        let set = parse(&clinvar_set(measure_set, OMIM_TRAIT));
        assert!(matches!(
            build_record(&set, &vocab()).unwrap(),
            BuildOutcome::Rejected { reason: RejectReason::IncompleteGenoVar, .. }
        ));
    }

    #[test]
    fn test_haplotype_keeps_set_type() {
        let measure_set = r#"
          <MeasureSet Type="Haplotype" ID="17002">
            <Measure Type="single nucleotide variant" ID="1"/>
            <Measure Type="deletion" ID="2"/>
          </MeasureSet>"#;
        let set = parse(&clinvar_set(measure_set, OMIM_TRAIT));
        let record = accepted(build_record(&set, &vocab()).unwrap());
        let GenoVar::Variant(variant) = &record.genovar else { panic!("expected a variant") };
        assert_eq!(variant.variant_type.as_deref(), Some("Haplotype"));
        let ids: Vec<&str> = variant.alleles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["ClinVarVariant:1", "ClinVarVariant:2"]);
    }

    #[test]
    fn test_unknown_set_type_is_fatal() {
        let measure_set = r#"<MeasureSet Type="Mystery" ID="1"><Measure Type="deletion" ID="2"/></MeasureSet>"#;
        let set = parse(&clinvar_set(measure_set, OMIM_TRAIT));
        assert!(matches!(
            build_record(&set, &vocab()),
            Err(ClinyxError::UnknownVariantType { .. })
        ));
    }

    #[test]
    fn test_uninferable_type_is_fatal() {
        let measure_set = r#"<MeasureSet Type="Variant" ID="1">
            <Measure Type="deletion" ID="2"/><Measure Type="insertion" ID="3"/>
          </MeasureSet>"#;
        let set = parse(&clinvar_set(measure_set, OMIM_TRAIT));
        assert!(matches!(
            build_record(&set, &vocab()),
            Err(ClinyxError::UnresolvedVariantType { .. })
        ));
    }

    #[test]
    fn test_genotype_set() {
        let genotype = r#"
          <GenotypeSet Type="CompoundHeterozygote" ID="424700">
            <Name><ElementValue Type="Preferred">c.[1A&gt;G];[2C&gt;T]</ElementValue></Name>
            <MeasureSet Type="Variant" ID="11"><Measure Type="single nucleotide variant" ID="111"/></MeasureSet>
            <MeasureSet Type="Variant" ID="12"><Measure Type="single nucleotide variant" ID="121"/></MeasureSet>
          </GenotypeSet>"#;
        let set = parse(&clinvar_set(genotype, OMIM_TRAIT));
        let record = accepted(build_record(&set, &vocab()).unwrap());
        let GenoVar::Genotype(g) = &record.genovar else { panic!("expected a genotype") };
        assert_eq!(g.id, "ClinVarVariant:424700");
        assert_eq!(g.variant_type.as_deref(), Some("CompoundHeterozygote"));
        assert_eq!(g.label.as_deref(), Some("c.[1A>G];[2C>T]"));
        assert_eq!(g.variants.len(), 2);
        assert_eq!(g.variants[1].alleles[0].id, "ClinVarVariant:12");
    }
}
