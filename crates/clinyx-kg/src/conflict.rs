//! Relations between sibling submissions of one ClinVar set.
//!
//! Each pathogenicity call carries a power-of-two severity weight; the
//! absolute weight difference of two calls picks the SEPIO relation that
//! links the two submissions.

use std::collections::BTreeMap;

use clinyx_common::{ClinyxError, Result};

/// The pathogenicity calls that take part in sibling linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathogenicityCall {
    Pathogenic,
    LikelyPathogenic,
    LikelyBenign,
    Benign,
    UncertainSignificance,
}

impl PathogenicityCall {
    /// Map a resolved GENO CURIE to a call. `None` for calls outside the
    /// weighted set (risk factor, drug response, ...).
    pub fn from_curie(curie: &str) -> Option<Self> {
        match curie {
            "GENO:0000840" => Some(PathogenicityCall::Pathogenic),
            "GENO:0000841" => Some(PathogenicityCall::LikelyPathogenic),
            "GENO:0000844" => Some(PathogenicityCall::LikelyBenign),
            "GENO:0000843" => Some(PathogenicityCall::Benign),
            "GENO:0000845" => Some(PathogenicityCall::UncertainSignificance),
            _ => None,
        }
    }

    pub fn curie(&self) -> &'static str {
        match self {
            PathogenicityCall::Pathogenic => "GENO:0000840",
            PathogenicityCall::LikelyPathogenic => "GENO:0000841",
            PathogenicityCall::LikelyBenign => "GENO:0000844",
            PathogenicityCall::Benign => "GENO:0000843",
            PathogenicityCall::UncertainSignificance => "GENO:0000845",
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            PathogenicityCall::Pathogenic => 1,
            PathogenicityCall::LikelyPathogenic => 2,
            PathogenicityCall::LikelyBenign => 4,
            PathogenicityCall::Benign => 8,
            PathogenicityCall::UncertainSignificance => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingRelation {
    EquivalentTo,
    ConsistentWith,
    Contradicts,
    StronglyContradicts,
    InconsistentWith,
}

impl SiblingRelation {
    /// Only differences reachable from the five weights are mapped; any other
    /// value is an error.
    pub fn from_difference(diff: u32) -> Result<Self> {
        match diff {
            0 => Ok(SiblingRelation::EquivalentTo),
            1 | 4 => Ok(SiblingRelation::ConsistentWith),
            2 | 3 | 6 => Ok(SiblingRelation::Contradicts),
            7 => Ok(SiblingRelation::StronglyContradicts),
            8 | 12 | 14 | 15 => Ok(SiblingRelation::InconsistentWith),
            other => Err(ClinyxError::UnmappedSeverityDiff(other)),
        }
    }

    pub fn between(a: PathogenicityCall, b: PathogenicityCall) -> Result<Self> {
        Self::from_difference(a.weight().abs_diff(b.weight()))
    }

    pub fn curie(&self) -> &'static str {
        match self {
            SiblingRelation::EquivalentTo => "SEPIO:0000098",
            SiblingRelation::ConsistentWith => "SEPIO:0000099",
            SiblingRelation::StronglyContradicts => "SEPIO:0000100",
            SiblingRelation::Contradicts => "SEPIO:0000101",
            SiblingRelation::InconsistentWith => "SEPIO:0000126",
        }
    }
}

/// One directed link `subject --relation--> object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingLink {
    pub subject: String,
    pub relation: SiblingRelation,
    pub object: String,
}

/// Link every pair of siblings in both directions.
///
/// Siblings are taken in key order; each one is removed before being compared
/// with the rest, so every unordered pair is visited once.
pub fn link_siblings(mut calls: BTreeMap<String, PathogenicityCall>) -> Result<Vec<SiblingLink>> {
    let mut links = Vec::new();
    while let Some((a, call_a)) = calls.pop_first() {
        for (b, call_b) in &calls {
            let relation = SiblingRelation::between(call_a, *call_b)?;
            links.push(SiblingLink { subject: a.clone(), relation, object: b.clone() });
            links.push(SiblingLink { subject: b.clone(), relation, object: a.clone() });
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PathogenicityCall::*;

    const ALL: [PathogenicityCall; 5] =
        [Pathogenic, LikelyPathogenic, LikelyBenign, Benign, UncertainSignificance];

    #[test]
    fn test_every_weight_difference_is_mapped() {
        for a in ALL {
            for b in ALL {
                assert!(SiblingRelation::between(a, b).is_ok(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_relation_table() {
        assert_eq!(SiblingRelation::between(Pathogenic, Benign).unwrap(), SiblingRelation::StronglyContradicts);
        assert_eq!(SiblingRelation::between(Pathogenic, LikelyPathogenic).unwrap(), SiblingRelation::ConsistentWith);
        assert_eq!(SiblingRelation::between(Benign, LikelyBenign).unwrap(), SiblingRelation::ConsistentWith);
        assert_eq!(SiblingRelation::between(LikelyPathogenic, LikelyBenign).unwrap(), SiblingRelation::Contradicts);
        assert_eq!(SiblingRelation::between(Pathogenic, UncertainSignificance).unwrap(), SiblingRelation::InconsistentWith);
        assert_eq!(SiblingRelation::between(Benign, Benign).unwrap(), SiblingRelation::EquivalentTo);
        assert_eq!(SiblingRelation::StronglyContradicts.curie(), "SEPIO:0000100");
    }

    #[test]
    fn test_unmapped_difference_fails() {
        assert!(matches!(
            SiblingRelation::from_difference(5),
            Err(ClinyxError::UnmappedSeverityDiff(5))
        ));
    }

    #[test]
    fn test_call_curies() {
        for call in ALL {
            assert_eq!(PathogenicityCall::from_curie(call.curie()), Some(call));
        }
        assert_eq!(PathogenicityCall::from_curie("GENO:0000842"), None);
    }

    #[test]
    fn test_links_are_symmetric_and_complete() {
        let calls: BTreeMap<String, PathogenicityCall> = ALL
            .iter()
            .enumerate()
            .map(|(i, call)| (format!("MONARCH:b{i}"), *call))
            .collect();
        let n = calls.len();
        let links = link_siblings(calls).unwrap();
        assert_eq!(links.len(), n * (n - 1));

        for link in &links {
            assert_ne!(link.subject, link.object);
            assert!(links.iter().any(|l| l.subject == link.object
                && l.object == link.subject
                && l.relation == link.relation));
        }
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let (a, b) = (format!("MONARCH:b{i}"), format!("MONARCH:b{j}"));
                    assert!(links.iter().any(|l| l.subject == a && l.object == b));
                }
            }
        }
    }

    #[test]
    fn test_pathogenic_vs_benign_strongly_contradicts() {
        let calls = BTreeMap::from([
            ("MONARCH:b1".to_string(), Pathogenic),
            ("MONARCH:b2".to_string(), Benign),
        ]);
        let links = link_siblings(calls).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.relation == SiblingRelation::StronglyContradicts));
        assert_eq!(links[0].subject, "MONARCH:b1");
        assert_eq!(links[1].subject, "MONARCH:b2");
    }

    #[test]
    fn test_single_sibling_has_no_links() {
        let calls = BTreeMap::from([("MONARCH:b1".to_string(), Benign)]);
        assert!(link_siblings(calls).unwrap().is_empty());
        assert!(link_siblings(BTreeMap::new()).unwrap().is_empty());
    }
}
