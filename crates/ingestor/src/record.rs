//! Loosely-typed access to raw source records.
//!
//! Source feeds deliver heterogeneous JSON objects whose optional parts may be missing, `null`,
//! or nested several levels deep. [`RawRecord`] wraps such an object and offers lookups that
//! answer `None` instead of failing. Only [`RawRecord::require`] reports an error, and it is
//! meant for the handful of fields a [`Paper`] cannot be built without.
//!
//! # Examples
//!
//! ```
//! use ingestor::record::RawRecord;
//! use serde_json::json;
//!
//! let record = RawRecord::new(json!({ "corpusid": 7, "externalids": { "MAG": "123" } }));
//!
//! assert_eq!(record.i64_at(&["corpusid"]), Some(7));
//! assert_eq!(record.str_at(&["externalids", "DOI"]), None);
//! assert_eq!(record.str_at(&["externalids", "DOI", "deeper"]), None);
//! ```

use super::*;

/// A single raw record as decoded from one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
  /// The decoded JSON document
  value: Value,
}

impl RawRecord {
  /// Wraps a decoded JSON document.
  pub fn new(value: Value) -> Self { Self { value } }

  /// Looks up a top-level key. `null` values count as absent.
  pub fn get(&self, key: &str) -> Option<&Value> { self.get_path(&[key]) }

  /// Follows `path` through nested objects.
  ///
  /// Returns `None` if any step is missing, is not an object, or the final value is `null`.
  pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
    path
      .iter()
      .try_fold(&self.value, |value, key| value.as_object()?.get(*key))
      .filter(|value| !value.is_null())
  }

  /// Returns the string at `path`, if present and a string.
  pub fn str_at(&self, path: &[&str]) -> Option<&str> { self.get_path(path)?.as_str() }

  /// Returns the integer at `path`, if present and an integer.
  pub fn i64_at(&self, path: &[&str]) -> Option<i64> { self.get_path(path)?.as_i64() }

  /// Looks up a field the caller cannot do without.
  ///
  /// # Errors
  ///
  /// Returns [`IngestorError::MissingField`] if the key is absent or `null`.
  pub fn require(&self, key: &'static str) -> Result<&Value, IngestorError> {
    self.get(key).ok_or(IngestorError::MissingField(key))
  }

  /// The underlying JSON document.
  pub fn as_value(&self) -> &Value { &self.value }
}

impl From<Value> for RawRecord {
  fn from(value: Value) -> Self { Self::new(value) }
}
