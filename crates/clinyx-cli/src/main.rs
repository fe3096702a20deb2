//! `clinyx`: ClinVar release → N-Triples.
//!
//! Configuration comes from `--config`, `CLINYX_CONFIG` or `./clinyx.toml`
//! (in that order); flags override individual fields.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clinyx_common::IngestConfig;
use clinyx_ingestion::IngestPipeline;

#[derive(Debug, Parser)]
#[command(name = "clinyx", version)]
#[command(about = "Convert a ClinVar XML release into evidence-model N-Triples")]
struct Args {
    /// Release file name inside the input directory
    #[arg(short, long)]
    filename: Option<String>,

    /// Gene/condition map file name inside the input directory
    #[arg(short, long)]
    mapfile: Option<String>,

    /// Directory holding the raw downloads
    #[arg(short, long)]
    inputdir: Option<PathBuf>,

    /// Local translation table
    #[arg(short, long)]
    localtt: Option<PathBuf>,

    /// Global translation table
    #[arg(short, long)]
    globaltt: Option<PathBuf>,

    /// CURIE prefix map
    #[arg(short, long)]
    curie_map: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Output file name
    #[arg(short, long)]
    output: Option<String>,

    /// Expand blank nodes to genid IRIs
    #[arg(short, long)]
    skolemize: Option<bool>,

    /// Also write review status → star score statements
    #[arg(long)]
    review_scores: bool,

    /// Configuration file (TOML, or YAML by extension)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<IngestConfig> {
        let config = match &self.config {
            Some(path) if path.extension().is_some_and(|e| e == "yaml" || e == "yml") => {
                IngestConfig::from_yaml(path)
            }
            Some(path) => IngestConfig::from_toml(path),
            None => IngestConfig::load(),
        };
        config.with_context(|| match &self.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })
    }

    fn apply(&self, config: &mut IngestConfig) {
        if let Some(filename) = &self.filename {
            config.input.filename = filename.clone();
        }
        if let Some(mapfile) = &self.mapfile {
            config.input.mapfile = mapfile.clone();
        }
        if let Some(dir) = &self.inputdir {
            config.input.dir = dir.clone();
        }
        if let Some(local) = &self.localtt {
            config.vocabulary.local = local.clone();
        }
        if let Some(global) = &self.globaltt {
            config.vocabulary.global = global.clone();
        }
        if let Some(curie_map) = &self.curie_map {
            config.vocabulary.curie_map = curie_map.clone();
        }
        if let Some(destination) = &self.destination {
            config.output.destination = destination.clone();
        }
        if let Some(output) = &self.output {
            config.output.filename = output.clone();
        }
        if let Some(skolemize) = self.skolemize {
            config.output.skolemize = skolemize;
        }
        if self.review_scores {
            config.output.review_scores = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = args.load_config()?;
    args.apply(&mut config);

    info!(
        input = %config.input_path().display(),
        output = %config.output_path().display(),
        skolemize = config.output.skolemize,
        "Starting ClinVar ingest"
    );

    let pipeline = IngestPipeline::from_config(config).context("Failed to prepare the ingest")?;
    let summary = pipeline
        .run()
        .with_context(|| format!("Ingest of {} failed", pipeline.config().input_path().display()))?;
    info!(
        statements = summary.statements,
        rejected = summary.rejected,
        "Wrote {}",
        summary.output.display()
    );
    Ok(())
}
