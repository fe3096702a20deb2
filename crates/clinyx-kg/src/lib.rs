//! clinyx-kg — Statement construction for the ClinVar evidence graph.
//!
//! - `curie`: prefix → namespace registry
//! - `codec`: CURIE/literal triples → N-Triples lines
//! - `resolver`: local → global vocabulary cascade
//! - `digest`: content-hash identifiers for anonymous nodes
//! - `conflict`: relations between sibling submissions

pub mod biolink;
pub mod codec;
pub mod conflict;
pub mod curie;
pub mod digest;
pub mod resolver;

pub use codec::{StatementCodec, TripleBuffer};
pub use conflict::{link_siblings, PathogenicityCall, SiblingLink, SiblingRelation};
pub use curie::{BlankNodeMode, CurieMap};
pub use digest::digest_id;
pub use resolver::Vocabulary;
