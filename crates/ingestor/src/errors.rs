//! Error types for the ingestor library.
//!
//! Every step of the pipeline reports failures through [`IngestorError`]. No step recovers
//! locally: an error from any stage aborts the whole run, and the binary turns it into a
//! non-zero exit status.
//!
//! The variants fall into a few groups:
//! - Caller input: [`IngestorError::UnsupportedSource`], [`IngestorError::UnsupportedMode`]
//! - Remote transfers: [`IngestorError::Transfer`]
//! - Input decoding: [`IngestorError::Parse`]
//! - Record normalization: [`IngestorError::MissingField`], [`IngestorError::InvalidField`],
//!   [`IngestorError::InvalidRecord`]
//! - Local plumbing: [`IngestorError::File`], [`IngestorError::Serialize`],
//!   [`IngestorError::Config`]
//!
//! # Examples
//!
//! ```
//! use ingestor::{errors::IngestorError, sources::Source};
//!
//! match "crossref".parse::<Source>() {
//!   Err(IngestorError::UnsupportedSource(name)) => assert_eq!(name, "crossref"),
//!   other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sources::Mode;

/// Errors that can occur while ingesting and republishing papers.
#[derive(Error, Debug)]
pub enum IngestorError {
  /// The requested source feed is not one the ingestor knows how to read.
  ///
  /// The string parameter holds the rejected source name.
  #[error("unsupported source `{0}`, only `s2ag` is supported")]
  UnsupportedSource(String),

  /// The requested ingestion mode is not supported.
  ///
  /// Only [`Mode::Sample`] can be loaded; the full corpus is rejected before any I/O.
  #[error("unsupported mode `{0}`, only sample data loading is supported")]
  UnsupportedMode(Mode),

  /// Copying a blob to or from the object store failed.
  ///
  /// This covers a missing remote object, an unreachable endpoint, denied permissions, and
  /// failures of the local directory-backed store.
  #[error("transfer of {bucket}/{key} failed: {message}")]
  Transfer {
    /// Bucket the object lives in
    bucket:  String,
    /// Key of the object inside the bucket
    key:     String,
    /// Description of the underlying failure
    message: String,
  },

  /// A line of the input file is not valid JSON.
  #[error("malformed JSON on line {line}: {source}")]
  Parse {
    /// 1-based line number in the decompressed input
    line:   usize,
    /// The decoder error
    source: serde_json::Error,
  },

  /// A raw record lacks a field the canonical paper cannot be built without.
  #[error("missing required field `{0}`")]
  MissingField(&'static str),

  /// A required raw field is present but holds a value of the wrong type.
  #[error("field `{field}` should be {expected}")]
  InvalidField {
    /// Name of the offending field
    field:    &'static str,
    /// Human readable description of the accepted type
    expected: &'static str,
  },

  /// Normalization of the record on a given input line failed.
  #[error("record on line {line} could not be normalized: {source}")]
  InvalidRecord {
    /// 1-based line number in the decompressed input
    line:   usize,
    /// The normalization error
    source: Box<IngestorError>,
  },

  /// Reading or writing a local file failed.
  #[error("{action} {} failed: {source}", .path.display())]
  File {
    /// The step that touched the file, e.g. `writing output dataset`
    action: &'static str,
    /// The file or directory involved
    path:   PathBuf,
    /// The underlying I/O error
    source: std::io::Error,
  },

  /// A paper could not be serialized for the output dataset.
  #[error(transparent)]
  Serialize(#[from] serde_json::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  Config(#[from] toml::de::Error),
}

impl IngestorError {
  /// Builds a [`IngestorError::Transfer`] for the given object.
  pub(crate) fn transfer(bucket: &str, key: &str, message: impl ToString) -> Self {
    IngestorError::Transfer {
      bucket:  bucket.to_owned(),
      key:     key.to_owned(),
      message: message.to_string(),
    }
  }

  /// Returns a mapper that attaches `action` and `path` to an [`std::io::Error`].
  pub(crate) fn file(action: &'static str, path: &Path) -> impl Fn(std::io::Error) -> Self {
    let path = path.to_owned();
    move |source| IngestorError::File { action, path: path.clone(), source }
  }

  /// Returns the name of the missing field if this error, or the error it wraps, reports one.
  ///
  /// # Examples
  ///
  /// ```
  /// use ingestor::errors::IngestorError;
  ///
  /// let err = IngestorError::InvalidRecord {
  ///   line:   3,
  ///   source: Box::new(IngestorError::MissingField("title")),
  /// };
  /// assert_eq!(err.missing_field(), Some("title"));
  /// ```
  pub fn missing_field(&self) -> Option<&'static str> {
    match self {
      IngestorError::MissingField(field) => Some(*field),
      IngestorError::InvalidRecord { source, .. } => source.missing_field(),
      _ => None,
    }
  }
}
