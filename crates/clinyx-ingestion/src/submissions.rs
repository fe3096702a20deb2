//! Evidence, assertion and provenance statements for the submissions (SCVs)
//! of one `ClinVarSet`.
//!
//! Each submission × usable condition is one association. Submissions whose
//! significance is missing, uncertain or "protective" contribute nothing and
//! are left out of sibling linking.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use clinyx_common::{ClinyxError, Result};
use clinyx_kg::biolink::{
    ASSOCIATION, DISEASE, EVIDENCE_TYPE, INFORMATION_CONTENT_ENTITY, ONTOLOGY_CLASS, PROCEDURE,
    PROVIDER, PUBLICATION, SEQUENCE_VARIANT,
};
use clinyx_kg::{digest_id, PathogenicityCall, TripleBuffer, Vocabulary};

use crate::models::{ClinVarRecord, Condition};
use crate::review::star_score;
use crate::xml::XmlElement;

const NOT_PROVIDED: &str = "not provided";
const UNCERTAIN: &str = "has_uncertain_significance_for_condition";
const PROTECTIVE: &str = "protective";
const PUBMED_ID: &str = r#"ID[@Source="PubMed"]"#;
const DESCRIPTION: &str = r#"Attribute[@Type="Description"]"#;

const ASSOC: Option<&str> = Some(ASSOCIATION);
const EVIDENCE: Option<&str> = Some(EVIDENCE_TYPE);
const ICE: Option<&str> = Some(INFORMATION_CONTENT_ENTITY);

/// Sibling association id → pathogenicity call, for conflict linking.
pub type PathogenicityCalls = BTreeMap<String, PathogenicityCall>;

/// The identifying parts of one `ClinVarAssertion`.
struct Submission<'x> {
    element: &'x XmlElement,
    id: &'x str,
    accession: &'x str,
    version: Option<&'x str>,
    org_id: &'x str,
    submitter: Option<&'x str>,
    /// Resolved significance CURIE
    call: String,
}

/// Explicit significance CURIE of a submission, or `None` when it should be
/// skipped.
fn explicit_significance(scv: &XmlElement, vocab: &Vocabulary, accession: &str) -> Option<String> {
    let description = scv.find_text("ClinicalSignificance/Description")?;
    if description == NOT_PROVIDED
        || description == PROTECTIVE
        || vocab.local(description) == Some(UNCERTAIN)
    {
        debug!(accession, description, "Submission significance is not explicit");
        return None;
    }
    let resolved = vocab.resolve(description);
    if !resolved.contains(':') {
        warn!(accession, description, resolved = %resolved, "Submission significance is not a CURIE");
        return None;
    }
    Some(resolved)
}

fn read_submission<'x>(
    scv: &'x XmlElement,
    vocab: &Vocabulary,
    record: &ClinVarRecord,
) -> Result<Option<Submission<'x>>> {
    let missing = |path: &str| ClinyxError::MissingElement {
        accession: record.accession.clone(),
        path: path.to_string(),
    };
    let id = scv.attr("ID").ok_or_else(|| missing("ClinVarAssertion/@ID"))?;
    let accession_element = scv
        .find("ClinVarAccession")
        .ok_or_else(|| missing("ClinVarAssertion/ClinVarAccession"))?;
    let accession = accession_element
        .attr("Acc")
        .ok_or_else(|| missing("ClinVarAccession/@Acc"))?;

    let Some(call) = explicit_significance(scv, vocab, accession) else {
        return Ok(None);
    };
    Ok(Some(Submission {
        element: scv,
        id,
        accession,
        version: accession_element.attr("Version"),
        org_id: accession_element
            .attr("OrgID")
            .ok_or_else(|| missing("ClinVarAccession/@OrgID"))?,
        submitter: scv.find("ClinVarSubmissionID").and_then(|s| s.attr("submitter")),
        call,
    }))
}

/// Append the statements for every submission in `set` and return the calls
/// of those that take part in sibling linking.
pub fn submission_statements(
    set: &XmlElement,
    record: &ClinVarRecord,
    vocab: &Vocabulary,
    buffer: &mut TripleBuffer<'_>,
) -> Result<PathogenicityCalls> {
    let score = match record.review_status.as_deref() {
        Some(status) => {
            let score = star_score(status);
            if score.is_none() {
                warn!(accession = %record.accession, status, "Unknown review status");
            }
            score
        }
        None => None,
    };

    let mut calls = PathogenicityCalls::new();
    for scv in set.find_all("ClinVarAssertion") {
        let Some(submission) = read_submission(scv, vocab, record)? else {
            continue;
        };
        let weighted = PathogenicityCall::from_curie(&submission.call);
        if weighted.is_none() {
            warn!(
                accession = submission.accession,
                call = %submission.call,
                "Significance outside the weighted calls; not linked to siblings"
            );
        }
        for condition in record.usable_conditions() {
            let association = association_statements(record, &submission, condition, score, vocab, buffer)?;
            if let Some(call) = weighted {
                calls.insert(association, call);
            }
        }
    }
    Ok(calls)
}

/// Statements for one submission × condition. Returns the association id.
fn association_statements(
    record: &ClinVarRecord,
    scv: &Submission<'_>,
    condition: &Condition,
    score: Option<u8>,
    vocab: &Vocabulary,
    buffer: &mut TripleBuffer<'_>,
) -> Result<String> {
    let (Some(condition_id), Some(disease)) = (condition.id.as_deref(), condition.curie()) else {
        return Err(ClinyxError::MissingElement {
            accession: record.accession.clone(),
            path: "Trait/XRef".to_string(),
        });
    };
    let variant = record.genovar.id();
    let label = vocab.term("label")?;
    let type_ = vocab.term("type")?;

    let monarch_id = digest_id(&format!("{}{}{}", record.id, scv.id, condition_id));
    let association = format!("MONARCH:{monarch_id}");
    let evidence = format!("_:{}", digest_id(&format!("{monarch_id}_evidence")));
    let assertion = format!("_:{}", digest_id(&format!("{monarch_id}_assertion")));
    let organization = format!("ClinVarSubmitters:{}", scv.org_id);

    if let Some(score) = score {
        buffer.add(&association, vocab.term("assertion_confidence_score")?, &score.to_string())?;
    }

    // ── Association ──────────────────────────────────────────────────────────
    buffer.add_categorised(&evidence, label, &format!("{monarch_id}_evidence"), EVIDENCE, None)?;
    buffer.add_categorised(&assertion, label, &format!("{monarch_id}_assertion"), ICE, None)?;
    buffer.add_categorised(&association, type_, vocab.term("association")?, ASSOC, Some(ONTOLOGY_CLASS))?;
    buffer.add_categorised(
        &association,
        vocab.term("association has subject")?,
        variant,
        ASSOC,
        Some(SEQUENCE_VARIANT),
    )?;
    buffer.add_categorised(&association, vocab.term("association has object")?, &disease, ASSOC, Some(DISEASE))?;
    if let Some(disease_label) = condition.label.as_deref() {
        buffer.add_categorised(&disease, label, disease_label, Some(DISEASE), None)?;
    }
    buffer.add_categorised(
        &association,
        vocab.term("has_supporting_evidence_line")?,
        &evidence,
        ASSOC,
        EVIDENCE,
    )?;
    buffer.add_categorised(&association, vocab.term("is_asserted_in")?, &assertion, ASSOC, ICE)?;

    // ── Evidence and assertion ───────────────────────────────────────────────
    buffer.add_categorised(&evidence, type_, vocab.term("evidence")?, EVIDENCE, Some(ONTOLOGY_CLASS))?;
    buffer.add_categorised(&assertion, type_, vocab.term("assertion")?, ICE, Some(ONTOLOGY_CLASS))?;
    buffer.add_categorised(&assertion, label, &format!("ClinVarAssertion_{}", scv.id), ICE, None)?;
    buffer.add_categorised(
        &assertion,
        vocab.term("is_assertion_supported_by_evidence")?,
        &evidence,
        ICE,
        None,
    )?;
    let identifier = match scv.version {
        Some(version) => format!("{}.{version}", scv.accession),
        None => scv.accession.to_string(),
    };
    buffer.add_categorised(&assertion, vocab.term("identifier")?, &identifier, ICE, ICE)?;
    buffer.add_categorised(&assertion, vocab.term("created_by")?, &organization, ICE, Some(PROVIDER))?;
    buffer.add_categorised(&organization, type_, vocab.term("organization")?, Some(PROVIDER), Some(PROVIDER))?;
    if let Some(submitter) = scv.submitter {
        buffer.add_categorised(&organization, label, submitter, Some(PROVIDER), None)?;
    }

    assertion_methods(scv, &assertion, vocab, buffer)?;

    // ── Citations ────────────────────────────────────────────────────────────
    let significance = scv.element.find("ClinicalSignificance");
    for pmid in significance
        .map(|s| s.find_all(&format!("Citation/{PUBMED_ID}")))
        .unwrap_or_default()
        .into_iter()
        .filter_map(XmlElement::text)
    {
        let pmid = format!("PMID:{pmid}");
        cite(&association, &evidence, &pmid, vocab, buffer)?;
        buffer.add_categorised(&pmid, type_, vocab.term("journal article")?, Some(PUBLICATION), None)?;
    }

    // ── Pathogenicity call ───────────────────────────────────────────────────
    buffer.add_categorised(&association, vocab.term("association has predicate")?, &scv.call, ASSOC, None)?;
    buffer.add_categorised(variant, &scv.call, &disease, Some(SEQUENCE_VARIANT), Some(DISEASE))?;
    buffer.add_categorised(
        &association,
        vocab.term("database_cross_reference")?,
        &format!("ClinVar:{}", record.accession),
        ASSOC,
        ICE,
    )?;

    observations(scv, &association, &evidence, vocab, buffer)?;
    Ok(association)
}

fn cite(
    association: &str,
    evidence: &str,
    pmid: &str,
    vocab: &Vocabulary,
    buffer: &mut TripleBuffer<'_>,
) -> Result<()> {
    buffer.add_categorised(
        evidence,
        vocab.term("has_supporting_reference")?,
        pmid,
        EVIDENCE,
        Some(PUBLICATION),
    )?;
    buffer.add_categorised(association, vocab.term("Source")?, pmid, ASSOC, Some(PUBLICATION))
}

/// `AttributeSet`s carrying an `AssertionMethod` attribute.
fn assertion_methods(
    scv: &Submission<'_>,
    assertion: &str,
    vocab: &Vocabulary,
    buffer: &mut TripleBuffer<'_>,
) -> Result<()> {
    let evaluated = scv
        .element
        .find("ClinicalSignificance")
        .and_then(|s| s.attr("DateLastEvaluated"));
    let label = vocab.term("label")?;

    for attribute_set in scv.element.find_all("AttributeSet") {
        let Some(method) = attribute_set
            .find(r#"Attribute[@Type="AssertionMethod"]"#)
            .and_then(XmlElement::text)
        else {
            continue;
        };
        if let Some(date) = evaluated {
            buffer.add_categorised(assertion, vocab.term("Date Created")?, date, ICE, None)?;
        }

        let method_label = format!("{method}_assertionmethod");
        let method_id = format!("_:{}", digest_id(&method_label));
        buffer.add_categorised(&method_id, label, &method_label, Some(PROCEDURE), None)?;
        buffer.add_categorised(assertion, vocab.term("is_specified_by")?, &method_id, ICE, Some(PROCEDURE))?;
        buffer.add_categorised(&method_id, vocab.term("type")?, vocab.term("assertion method")?, Some(PROCEDURE), None)?;
        buffer.add_categorised(&method_id, label, method, Some(PROCEDURE), None)?;

        if let Some(url) = attribute_set.find_text("Citation/URL") {
            buffer.add_categorised(&method_id, vocab.term("has_url")?, url, Some(PROCEDURE), ICE)?;
        }
    }
    Ok(())
}

/// `ObservedIn` citations, descriptions and method types.
fn observations(
    scv: &Submission<'_>,
    association: &str,
    evidence: &str,
    vocab: &Vocabulary,
    buffer: &mut TripleBuffer<'_>,
) -> Result<()> {
    let label = vocab.term("label")?;
    let type_ = vocab.term("type")?;

    for observed in scv.element.find_all("ObservedIn") {
        for data in observed.find_all("ObservedData") {
            for citation in data.find_all("Citation") {
                let pmids: Vec<String> = citation
                    .find_all(PUBMED_ID)
                    .into_iter()
                    .filter_map(XmlElement::text)
                    .map(|id| format!("PMID:{id}"))
                    .collect();
                for pmid in &pmids {
                    cite(association, evidence, pmid, vocab, buffer)?;
                    buffer.add_categorised(
                        pmid,
                        type_,
                        vocab.term("journal article")?,
                        Some(PUBLICATION),
                        ICE,
                    )?;
                }
                for comment in citation.find_all(DESCRIPTION).into_iter().filter_map(XmlElement::text) {
                    for pmid in &pmids {
                        buffer.add_categorised(pmid, vocab.term("comment")?, comment, Some(PUBLICATION), None)?;
                    }
                }
            }
            for description in data.find_all(DESCRIPTION).into_iter().filter_map(XmlElement::text) {
                if description != NOT_PROVIDED {
                    buffer.add_categorised(evidence, vocab.term("description")?, description, EVIDENCE, None)?;
                }
            }
        }

        for method_type in observed
            .find_all("Method/MethodType")
            .into_iter()
            .filter_map(XmlElement::text)
            .filter(|t| *t != NOT_PROVIDED)
        {
            let evidence_type = vocab.resolve(method_type);
            let provenance_label = format!("{evidence}{evidence_type}");
            let provenance = format!("_:{}", digest_id(&provenance_label));
            buffer.add_categorised(&provenance, label, &provenance_label, EVIDENCE, None)?;
            buffer.add_categorised(evidence, vocab.term("has_supporting_activity")?, &provenance, EVIDENCE, EVIDENCE)?;
            buffer.add_categorised(&provenance, type_, &evidence_type, EVIDENCE, Some(ONTOLOGY_CLASS))?;
            buffer.add_categorised(&provenance, label, method_type, EVIDENCE, None)?;
        }
    }
    Ok(())
}
