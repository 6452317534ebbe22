//! Orchestration of a complete ingestion run.
//!
//! A run is strictly sequential: every step finishes before the next one starts.
//!
//! 1. Validate the requested source and mode
//! 2. Fetch the sample from the object store unless it is already cached locally
//! 3. Decode and normalize every record, in file order
//! 4. Drop duplicate identifiers, keeping the first occurrence
//! 5. Write the dataset locally and publish it to the object store
//!
//! Any error aborts the run. A record that can not be normalized fails the whole run rather
//! than being skipped, so a published dataset always covers the complete input.

use super::*;
use crate::{dataset, dedup::dedup_papers};

/// Counts describing a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  /// Papers normalized from the input
  pub loaded:     usize,
  /// Papers written to the published dataset
  pub published:  usize,
  /// Papers dropped as duplicates
  pub duplicates: usize,
}

/// An ingestion job bound to its configuration and object store.
#[derive(Debug)]
pub struct Pipeline<S> {
  /// Locations of the input and output
  config: Config,
  /// Gateway used for fetching and publishing
  store:  S,
}

impl<S: ObjectStore> Pipeline<S> {
  /// Creates a pipeline.
  pub fn new(config: Config, store: S) -> Self { Self { config, store } }

  /// The configuration this pipeline runs with.
  pub fn config(&self) -> &Config { &self.config }

  /// The object store this pipeline talks to.
  pub fn store(&self) -> &S { &self.store }

  /// Loads every paper of `source` in the given `mode`, in input file order.
  ///
  /// # Errors
  ///
  /// - [`IngestorError::UnsupportedSource`] or [`IngestorError::UnsupportedMode`] before any
  ///   I/O happens
  /// - [`IngestorError::Transfer`] if the sample is not cached and can not be fetched
  /// - [`IngestorError::Parse`] for a malformed input line
  /// - [`IngestorError::InvalidRecord`] for a record lacking a required field
  pub async fn load_papers(&self, source: &str, mode: Mode) -> Result<Vec<Paper>, IngestorError> {
    self.load(source.parse()?, mode).await
  }

  /// See [`Pipeline::load_papers`].
  async fn load(&self, source: Source, mode: Mode) -> Result<Vec<Paper>, IngestorError> {
    if mode != Mode::Sample {
      return Err(IngestorError::UnsupportedMode(mode));
    }

    let (bucket, key, local_path) = match source {
      Source::S2ag => {
        let s2ag = &self.config.source.s2ag;
        (&self.config.source.bucket, &s2ag.samples_key, &s2ag.samples_local_path)
      },
    };

    if local_path.exists() {
      debug!("Using cached {source} sample at {}", local_path.display());
    } else {
      self.store.fetch(bucket, key, local_path).await?;
    }

    let normalizer = source.normalizer();
    let mut papers = Vec::new();
    for record in dataset::read_records(local_path)? {
      let (line, record) = record?;
      let paper = normalizer
        .normalize(&record)
        .map_err(|e| IngestorError::InvalidRecord { line, source: Box::new(e) })?;
      papers.push(paper);
    }

    info!("Loaded {} {source} papers from {}", papers.len(), local_path.display());
    Ok(papers)
  }

  /// Writes `papers` to the configured local path and publishes the file.
  ///
  /// Returns the number of papers published.
  pub async fn publish_papers(&self, papers: &[Paper]) -> Result<usize, IngestorError> {
    let output = &self.config.output;
    let written = dataset::write_papers(&output.local_path, papers)?;
    self.store.publish(&output.bucket, &output.local_path, &output.key).await?;
    info!("Published {written} papers to {}/{}", output.bucket, output.key);
    Ok(written)
  }

  /// Runs the whole job on the S2AG sample: load, deduplicate, write, publish.
  pub async fn run(&self) -> Result<RunSummary, IngestorError> {
    info!("Loading papers.");
    let papers = self.load(Source::S2ag, Mode::Sample).await?;
    let loaded = papers.len();

    info!("Deduplicating papers by the id.");
    let papers = dedup_papers(papers);

    info!("Publishing {} papers.", papers.len());
    let published = self.publish_papers(&papers).await?;

    let summary = RunSummary { loaded, published, duplicates: loaded - published };
    info!(loaded, published, duplicates = summary.duplicates, "Ingestion finished");
    Ok(summary)
  }
}
