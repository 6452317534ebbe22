//! Error types for the `paper-ingestor` binary.
//!
//! The binary has little to do besides wiring the library together, so its error type simply
//! forwards the library's errors and any I/O failures around them. Returning it from `main`
//! makes every failure end the process with a non-zero status.

use thiserror::Error;

/// Errors that can end a run of the binary.
#[derive(Error, Debug)]
pub enum IngestorCliError {
  /// Errors from the underlying ingestor library
  #[error(transparent)]
  Ingestor(#[from] ingestor::errors::IngestorError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),
}
