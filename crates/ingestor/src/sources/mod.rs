//! Source feeds and the normalizers that turn their records into [`Paper`]s.
//!
//! Each supported feed gets a submodule with a [`Normalizer`] implementation. All of them share
//! one contract: one raw record in, exactly one [`Paper`] out, or an error naming the field that
//! made the record unusable.
//!
//! # Supported Sources
//!
//! - [`s2ag`] - Semantic Scholar Academic Graph sample feed
//!
//! # Examples
//!
//! ```
//! use ingestor::{
//!   record::RawRecord,
//!   sources::{Normalizer, Source},
//! };
//! use serde_json::json;
//!
//! let source: Source = "s2ag".parse()?;
//! let record = RawRecord::new(json!({
//!   "corpusid": 1,
//!   "title": "Paper",
//!   "authors": [],
//!   "url": "https://www.semanticscholar.org/paper/1"
//! }));
//!
//! let paper = source.normalizer().normalize(&record)?;
//! assert_eq!(paper.title, "Paper");
//! # Ok::<(), ingestor::errors::IngestorError>(())
//! ```

pub mod s2ag;

pub use s2ag::S2agNormalizer;

use super::*;

/// Maps raw records of one source feed onto the canonical [`Paper`].
pub trait Normalizer {
  /// Normalizes a single raw record.
  ///
  /// # Errors
  ///
  /// Returns [`IngestorError::MissingField`] or [`IngestorError::InvalidField`] when a field the
  /// paper requires is absent or unusable. Optional fields never cause an error.
  fn normalize(&self, record: &RawRecord) -> Result<Paper, IngestorError>;
}

/// A feed of raw paper records the ingestor can read.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
  /// The Semantic Scholar Academic Graph
  S2ag,
}

impl Source {
  /// Returns the normalizer for records of this source.
  pub fn normalizer(&self) -> impl Normalizer {
    match self {
      Source::S2ag => S2agNormalizer::new(),
    }
  }
}

impl Display for Source {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Source::S2ag => write!(f, "s2ag"),
    }
  }
}

impl FromStr for Source {
  type Err = IngestorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match &s.to_lowercase() as &str {
      "s2ag" => Ok(Source::S2ag),
      _ => Err(IngestorError::UnsupportedSource(s.to_owned())),
    }
  }
}

/// How much of a source to ingest.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  /// A small pre-selected subset of the corpus
  #[default]
  Sample,
  /// The complete corpus
  Full,
}

impl Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Mode::Sample => write!(f, "sample"),
      Mode::Full => write!(f, "full"),
    }
  }
}
