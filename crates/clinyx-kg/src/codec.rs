//! Statement codec: (subject, predicate, object) CURIE/literal strings → N-Triples lines.
//!
//! Subjects and predicates must be registered CURIEs. Objects are typed in
//! this order: registered CURIE → reference, all digits → `xsd:integer`,
//! otherwise numeric → `xsd:double`, anything else → escaped string literal.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use clinyx_common::{ClinyxError, Result};

use crate::biolink;
use crate::curie::CurieMap;

/// Shorthand accepted for `rdf:type`.
pub const TYPE_SHORTHAND: &str = "a";

const RDF_TYPE: &str = "rdf:type";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

/// ASCII-centric; will not accept some valid UTF-8 CURIEs.
fn curie_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^.*:[A-Za-z0-9_][A-Za-z0-9_.]*[A-Za-z0-9_]*$").expect("valid regex")
    })
}

/// Split `prefix:local` when the token has the CURIE shape and exactly one colon.
fn split_curie(token: &str) -> Option<(&str, &str)> {
    if !curie_re().is_match(token) {
        return None;
    }
    let mut parts = token.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(local), None) => Some((prefix, local)),
        _ => None,
    }
}

/// True when `token` looks like a CURIE or an absolute network IRI.
pub fn is_reference_like(token: &str) -> bool {
    if curie_re().is_match(token) {
        return true;
    }
    let scheme = token.split(':').next().unwrap_or_default().to_ascii_lowercase();
    matches!(scheme.as_str(), "http" | "https" | "ftp")
}

fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_double(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        && token.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Escape a string literal body for N-Triples. One enclosing pair of quotes
/// is dropped; unpaired quotes are kept and escaped.
pub fn escape_literal(raw: &str) -> String {
    let trimmed = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(trimmed.len() + 8);
    for c in trimmed.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_literal`] for a literal body (without the quotes).
pub fn unescape_literal(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct StatementCodec {
    curies: CurieMap,
}

impl StatementCodec {
    pub fn new(curies: CurieMap) -> Self {
        Self { curies }
    }

    pub fn curies(&self) -> &CurieMap {
        &self.curies
    }

    /// Expand a registered CURIE to its wrapped form, `None` otherwise.
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = split_curie(curie)?;
        self.curies.render(prefix, local)
    }

    /// Render an object token as a reference or typed literal.
    pub fn render_object(&self, object: &str) -> String {
        if let Some(reference) = self.expand(object) {
            return reference;
        }
        if is_integer(object) {
            format!("\"{object}\"^^<{XSD_INTEGER}>")
        } else if is_double(object) {
            format!("\"{object}\"^^<{XSD_DOUBLE}>")
        } else {
            format!("\"{}\"", escape_literal(object))
        }
    }

    fn render_node(&self, role: &'static str, token: &str) -> Result<String> {
        let invalid = || ClinyxError::InvalidCurie { role, token: token.to_string() };
        let mut parts = token.split(':');
        let (prefix, local) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(local), None) => (prefix, local),
            _ => return Err(invalid()),
        };
        self.curies.render(prefix, local).ok_or_else(invalid)
    }

    /// One statement line, without categories.
    pub fn statement(&self, subject: &str, predicate: &str, object: &str) -> Result<String> {
        let predicate = if predicate == TYPE_SHORTHAND { RDF_TYPE } else { predicate };
        if object.is_empty() {
            return Err(ClinyxError::EmptyObject {
                subject: subject.to_string(),
                predicate: predicate.to_string(),
            });
        }
        let s = self.render_node("subject", subject)?;
        let p = self.render_node("predicate", predicate)?;
        let o = self.render_object(object);
        Ok(format!("{s} {p} {o} ."))
    }

    /// The statement line followed by any category lines for the subject
    /// and object.
    pub fn make_spo(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        subject_category: Option<&str>,
        object_category: Option<&str>,
    ) -> Result<Vec<String>> {
        let mut lines = vec![self.statement(subject, predicate, object)?];
        if let Some(cat) = subject_category {
            lines.extend(self.category(subject, &self.render_node("subject", subject)?, cat));
        }
        if let Some(cat) = object_category {
            lines.extend(self.category(object, &self.render_object(object), cat));
        }
        Ok(lines)
    }

    fn category(&self, token: &str, rendered: &str, category: &str) -> Option<String> {
        let is_node = rendered.starts_with('<') || rendered.starts_with("_:");
        if !is_reference_like(token) || !is_node {
            return None;
        }
        match (self.expand(biolink::CATEGORY), self.expand(category)) {
            (Some(p), Some(o)) => Some(format!("{rendered} {p} {o} .")),
            _ => {
                debug!(token, category, "Category does not expand; skipped");
                None
            }
        }
    }
}

// ── Buffer ───────────────────────────────────────────────────────────────────

/// Statements for one unit of work, kept until the caller decides to keep
/// or drop them.
#[derive(Debug)]
pub struct TripleBuffer<'c> {
    codec: &'c StatementCodec,
    lines: Vec<String>,
}

impl<'c> TripleBuffer<'c> {
    pub fn new(codec: &'c StatementCodec) -> Self {
        Self { codec, lines: Vec::new() }
    }

    pub fn codec(&self) -> &'c StatementCodec {
        self.codec
    }

    pub fn add(&mut self, subject: &str, predicate: &str, object: &str) -> Result<()> {
        self.lines.push(self.codec.statement(subject, predicate, object)?);
        Ok(())
    }

    pub fn add_categorised(
        &mut self,
        subject: &str,
        predicate: &str,
        object: &str,
        subject_category: Option<&str>,
        object_category: Option<&str>,
    ) -> Result<()> {
        let lines = self
            .codec
            .make_spo(subject, predicate, object, subject_category, object_category)?;
        self.lines.extend(lines);
        Ok(())
    }

    pub fn append(&mut self, other: TripleBuffer<'_>) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curie::BlankNodeMode;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn codec(mode: BlankNodeMode) -> StatementCodec {
        let prefixes = HashMap::from([
            ("rdf".to_string(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string()),
            ("rdfs".to_string(), "http://www.w3.org/2000/01/rdf-schema#".to_string()),
            ("OMIM".to_string(), "http://omim.org/entry/".to_string()),
            ("ClinVarVariant".to_string(), "http://www.ncbi.nlm.nih.gov/clinvar/variation/".to_string()),
            ("SO".to_string(), "http://purl.obolibrary.org/obo/SO_".to_string()),
            ("biolink".to_string(), "https://w3id.org/biolink/vocab/".to_string()),
        ]);
        StatementCodec::new(CurieMap::new(prefixes, mode))
    }

    #[test]
    fn test_registered_curie_object_is_reference() {
        let codec = codec(BlankNodeMode::Skolemize);
        for token in ["OMIM:114480", "SO:0001483", "ClinVarVariant:12_3.a"] {
            assert!(is_reference_like(token));
            let line = codec.statement("ClinVarVariant:1", "rdfs:label", token).unwrap();
            let expanded = codec.expand(token).unwrap();
            assert!(expanded.starts_with('<') && expanded.ends_with('>'));
            assert!(line.contains(&expanded), "{line}");
        }
    }

    #[test]
    fn test_type_shorthand() {
        let codec = codec(BlankNodeMode::Skolemize);
        let line = codec.statement("ClinVarVariant:1", "a", "SO:0001483").unwrap();
        assert_eq!(
            line,
            "<http://www.ncbi.nlm.nih.gov/clinvar/variation/1> \
             <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
             <http://purl.obolibrary.org/obo/SO_0001483> ."
        );
    }

    #[test]
    fn test_typed_literals() {
        let codec = codec(BlankNodeMode::Skolemize);
        assert_eq!(
            codec.render_object("42"),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(
            codec.render_object("0.25"),
            "\"0.25\"^^<http://www.w3.org/2001/XMLSchema#double>"
        );
        assert_eq!(codec.render_object("2016-03-01"), "\"2016-03-01\"");
        assert_eq!(codec.render_object("UNKNOWN:1"), "\"UNKNOWN:1\"");
    }

    #[test]
    fn test_literal_escaping_roundtrip() {
        let codec = codec(BlankNodeMode::Skolemize);
        let originals = [
            "back\\slash",
            "say \"hi\" now",
            "two\nlines",
            "tab\there",
            "mixed \\n \"q\"\r\n\t end",
        ];
        for original in originals {
            let rendered = codec.render_object(original);
            assert!(rendered.starts_with('"') && rendered.ends_with('"'));
            assert!(!rendered.contains('\n') && !rendered.contains('\t'));
            let body = &rendered[1..rendered.len() - 1];
            assert_eq!(unescape_literal(body), original);
        }
    }

    #[test]
    fn test_enclosing_quotes_stripped() {
        let codec = codec(BlankNodeMode::Skolemize);
        assert_eq!(codec.render_object("\"quoted\""), "\"quoted\"");
        assert_eq!(codec.render_object("\"\""), "\"\"");
        assert_eq!(codec.render_object("\""), "\"\\\"\"");
    }

    #[test]
    fn test_unpaired_quotes_survive() {
        let codec = codec(BlankNodeMode::Skolemize);
        for original in ["He said \"no\"", "\"open ended", "closed only\""] {
            let rendered = codec.render_object(original);
            let body = &rendered[1..rendered.len() - 1];
            assert_eq!(unescape_literal(body), original);
        }
        assert_eq!(codec.render_object("He said \"no\""), "\"He said \\\"no\\\"\"");
    }

    #[test]
    fn test_invalid_subject_and_predicate() {
        let codec = codec(BlankNodeMode::Skolemize);
        assert!(matches!(
            codec.statement("no-colon", "rdfs:label", "x"),
            Err(ClinyxError::InvalidCurie { role: "subject", .. })
        ));
        assert!(matches!(
            codec.statement("OMIM:1", "nope:label", "x"),
            Err(ClinyxError::InvalidCurie { role: "predicate", .. })
        ));
        assert!(matches!(
            codec.statement("OMIM:1", "rdfs:label", ""),
            Err(ClinyxError::EmptyObject { .. })
        ));
    }

    #[test]
    fn test_blank_node_modes() {
        let plain = codec(BlankNodeMode::Plain);
        let line = plain.statement("_:b1234", "rdfs:label", "_:b5678").unwrap();
        assert_eq!(line, "_:b1234 <http://www.w3.org/2000/01/rdf-schema#label> _:b5678 .");

        let skolem = codec(BlankNodeMode::Skolemize);
        let line = skolem.statement("_:b1234", "rdfs:label", "x").unwrap();
        assert!(line.starts_with("<https://monarchinitiative.org/.well-known/genid/b1234>"));
    }

    #[test]
    fn test_categories_only_for_references() {
        let codec = codec(BlankNodeMode::Skolemize);
        let lines = codec
            .make_spo(
                "ClinVarVariant:1",
                "rdfs:label",
                "a plain label",
                Some(biolink::SEQUENCE_VARIANT),
                Some(biolink::SEQUENCE_VARIANT),
            )
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "<http://www.ncbi.nlm.nih.gov/clinvar/variation/1> \
             <https://w3id.org/biolink/vocab/category> \
             <https://w3id.org/biolink/vocab/SequenceVariant> ."
        );

        let lines = codec
            .make_spo("ClinVarVariant:1", "a", "SO:0001483", None, Some(biolink::ONTOLOGY_CLASS))
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("<http://purl.obolibrary.org/obo/SO_0001483>"));
    }

    #[test]
    fn test_unexpandable_category_is_skipped() {
        let codec = codec(BlankNodeMode::Skolemize);
        let lines = codec
            .make_spo("OMIM:1", "rdfs:label", "x", Some("nope:Thing"), None)
            .unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_network_iri_is_reference_like_but_literal() {
        let codec = codec(BlankNodeMode::Skolemize);
        assert!(is_reference_like("https://example.org/method.pdf"));
        let lines = codec
            .make_spo(
                "OMIM:1",
                "rdfs:label",
                "https://example.org/method.pdf",
                None,
                Some(biolink::INFORMATION_CONTENT_ENTITY),
            )
            .unwrap();
        assert_eq!(lines, vec![
            "<http://omim.org/entry/1> <http://www.w3.org/2000/01/rdf-schema#label> \
             \"https://example.org/method.pdf\" ."
                .to_string()
        ]);
    }

    #[test]
    fn test_buffer_collects_lines() {
        let codec = codec(BlankNodeMode::Skolemize);
        let mut buffer = TripleBuffer::new(&codec);
        buffer.add("OMIM:1", "rdfs:label", "one").unwrap();
        let mut other = TripleBuffer::new(&codec);
        other.add_categorised("OMIM:2", "rdfs:label", "two", Some(biolink::DISEASE), None).unwrap();
        buffer.append(other);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.add("bad", "rdfs:label", "x").is_err());
        assert_eq!(buffer.into_lines().len(), 3);
    }
}
