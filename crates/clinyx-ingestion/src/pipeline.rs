//! End-to-end ClinVar ingest.
//!
//! For each `ClinVarSet` in the release:
//!   1. Build the reference record (or reject it to the side file)
//!   2. Emit variant/gene statements
//!   3. Emit evidence for each explicit submission
//!   4. Link sibling submissions by their pathogenicity calls
//!   5. Merge the set's statements into the release-wide statement set
//!
//! The statement set is written to a temporary file and renamed over the
//! final output only once it is complete.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use clinyx_common::{IngestConfig, Result};
use clinyx_kg::{link_siblings, BlankNodeMode, CurieMap, StatementCodec, TripleBuffer, Vocabulary};

use crate::builder::{build_record, BuildOutcome};
use crate::review::review_status_scores;
use crate::sources::clinvar::{open_input, ClinVarSetReader};
use crate::sources::gene_condition::GeneConditionMap;
use crate::statements::record_statements;
use crate::submissions::submission_statements;
use crate::xml::XmlElement;

const FULL_RELEASE: &str = "full";

/// Counts and paths reported at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    pub total: usize,
    pub rejected: usize,
    pub statements: usize,
    pub output: PathBuf,
    pub reject: PathBuf,
}

pub struct IngestPipeline {
    config: IngestConfig,
    vocab: Vocabulary,
    codec: StatementCodec,
    genes: GeneConditionMap,
}

impl IngestPipeline {
    pub fn new(
        config: IngestConfig,
        vocab: Vocabulary,
        codec: StatementCodec,
        genes: GeneConditionMap,
    ) -> Self {
        Self { config, vocab, codec, genes }
    }

    /// Load the translation tables, namespace registry and gene/condition
    /// map named by `config`.
    pub fn from_config(config: IngestConfig) -> Result<Self> {
        let vocab = Vocabulary::from_yaml_files(&config.vocabulary.local, &config.vocabulary.global)?;
        let curies = CurieMap::from_yaml(
            &config.vocabulary.curie_map,
            BlankNodeMode::from(config.output.skolemize),
        )?;
        info!(prefixes = curies.len(), "Loaded namespace registry");
        let genes = GeneConditionMap::from_path(&config.mapfile_path())?;
        Ok(Self::new(config, vocab, StatementCodec::new(curies), genes))
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Stream the release, then publish the statement set.
    #[instrument(skip(self), fields(input = %self.config.input_path().display()))]
    pub fn run(&self) -> Result<IngestSummary> {
        let config = &self.config;
        fs::create_dir_all(&config.output.destination)?;

        let partial = config.partial_output_path();
        let output = config.output_path();
        let reject_path = config.reject_path();
        match fs::remove_file(&partial) {
            Ok(()) => debug!(path = %partial.display(), "Removed stale partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %partial.display(), "Fresh start")
            }
            Err(e) => return Err(e.into()),
        }
        let mut partial_file = BufWriter::new(File::create(&partial)?);
        let mut reject = BufWriter::new(File::create(&reject_path)?);

        let mut release = BTreeSet::new();
        let dataset = format!("MonarchData:{}", config.output.filename);
        release.insert(
            self.codec
                .statement(&dataset, self.vocab.term("type")?, self.vocab.term("ontology")?)?,
        );

        let mut reader = ClinVarSetReader::new(open_input(&config.input_path())?);
        let (mut total, mut rejected) = (0usize, 0usize);
        for set in reader.by_ref() {
            let set = set?;
            total += 1;
            if !self.process_set(&set, &mut release)? {
                rejected += 1;
                writeln!(reject, "{}", set.to_xml()?)?;
            }
        }

        let release_info = reader.release();
        if release_info.kind.as_deref() != Some(FULL_RELEASE) {
            warn!(kind = ?release_info.kind, "Not a full release");
        }
        match release_info.dated.as_deref() {
            Some(dated) => {
                release.insert(self.codec.statement(
                    &dataset,
                    self.vocab.term("version_info")?,
                    dated,
                )?);
            }
            None => warn!("Release has no Dated attribute"),
        }
        if config.output.review_scores {
            release.extend(review_status_scores(&self.vocab, &self.codec)?);
        }

        for line in &release {
            writeln!(partial_file, "{line}")?;
        }
        partial_file.flush()?;
        partial_file.get_ref().sync_all()?;
        drop(partial_file);
        fs::rename(&partial, &output)?;
        reject.flush()?;

        let summary = IngestSummary {
            total,
            rejected,
            statements: release.len(),
            output,
            reject: reject_path,
        };
        info!(
            total = summary.total,
            rejected = summary.rejected,
            statements = summary.statements,
            output = %summary.output.display(),
            "ClinVar ingest complete"
        );
        if summary.rejected > 0 {
            warn!(
                "{} out of {} records not included are written back to {}",
                summary.rejected,
                summary.total,
                summary.reject.display()
            );
        }
        Ok(summary)
    }

    /// Statements for one `ClinVarSet`, merged into `release`. Returns
    /// `false` when the set was rejected.
    pub fn process_set(&self, set: &XmlElement, release: &mut BTreeSet<String>) -> Result<bool> {
        let record = match build_record(set, &self.vocab)? {
            BuildOutcome::Accepted(record) => record,
            BuildOutcome::Rejected { accession, reason } => {
                info!(accession = %accession, reason = reason.as_str(), "Record is under specified; skipping");
                return Ok(false);
            }
        };

        let mut buffer = TripleBuffer::new(&self.codec);
        record_statements(&record, &self.vocab, &self.genes, &mut buffer)?;
        let calls = submission_statements(set, &record, &self.vocab, &mut buffer)?;
        for link in link_siblings(calls)? {
            buffer.add(&link.subject, link.relation.curie(), &link.object)?;
        }
        release.extend(buffer.into_lines());
        Ok(true)
    }
}
