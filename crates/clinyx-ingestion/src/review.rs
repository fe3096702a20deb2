//! ClinVar review status → gold-star score (0–4).
//!
//! See "Review status" in the ClinVar documentation: no assertion criteria
//! scores 0, a single submitter with criteria 1, several agreeing submitters
//! 2, an expert panel 3 and a practice guideline 4.

use clinyx_common::Result;
use clinyx_kg::{StatementCodec, Vocabulary};

pub const STATUS_SCORES: [(&str, u8); 7] = [
    ("no assertion criteria provided", 0),
    ("no assertion provided", 0),
    ("criteria provided, single submitter", 1),
    ("criteria provided, conflicting interpretations", 1),
    ("criteria provided, multiple submitters, no conflicts", 2),
    ("reviewed by expert panel", 3),
    ("practice guideline", 4),
];

pub fn star_score(status: &str) -> Option<u8> {
    STATUS_SCORES
        .iter()
        .find(|(s, _)| *s == status.trim())
        .map(|(_, score)| *score)
}

/// One `<status> has-specified-numeric-value <stars>` line per review status.
pub fn review_status_scores(vocab: &Vocabulary, codec: &StatementCodec) -> Result<Vec<String>> {
    let predicate = vocab.term("has specified numeric value")?;
    STATUS_SCORES
        .iter()
        .map(|(status, score)| codec.statement(vocab.term(status)?, predicate, &score.to_string()))
        .collect()
}
