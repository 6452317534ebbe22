//! Normalizer for the Semantic Scholar Academic Graph (S2AG) sample feed.
//!
//! S2AG paper records look like
//!
//! ```json
//! {
//!   "corpusid": 42,
//!   "title": "Some Paper",
//!   "authors": [{ "authorId": "1", "name": "Ada Lovelace" }],
//!   "year": 1843,
//!   "externalids": { "DOI": "10.1000/xyz", "MAG": "123" },
//!   "url": "https://www.semanticscholar.org/paper/..."
//! }
//! ```
//!
//! Only `corpusid` and `title` are required. The feed supplies neither abstracts nor citation
//! lists, so those stay empty on the resulting [`Paper`].

use super::*;

/// Maximum number of author names kept per paper.
pub const MAX_AUTHOR_NAMES: usize = 500;

/// Converts S2AG paper records into [`Paper`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct S2agNormalizer;

impl S2agNormalizer {
  /// Creates a new S2AG normalizer.
  pub fn new() -> Self { Self }
}

impl Normalizer for S2agNormalizer {
  fn normalize(&self, record: &RawRecord) -> Result<Paper, IngestorError> {
    let unique_id = match record.require("corpusid")? {
      Value::Number(n) => n.as_i64().map(PaperId::Integer),
      Value::String(s) => Some(PaperId::Text(s.clone())),
      _ => None,
    }
    .ok_or(IngestorError::InvalidField {
      field:    "corpusid",
      expected: "a signed 64-bit integer or a string",
    })?;

    let title = record
      .require("title")?
      .as_str()
      .ok_or(IngestorError::InvalidField { field: "title", expected: "a string" })?;

    let mut paper = Paper::new(unique_id, title);
    paper.author_names = author_names(record);
    paper.publication_year = record.i64_at(&["year"]);
    paper.doi = record.str_at(&["externalids", "DOI"]).map(str::to_owned);
    paper.urls = record.str_at(&["url"]).map(|url| vec![url.to_owned()]).unwrap_or_default();

    trace!("Normalized S2AG record {}: {:?}", paper.unique_id, paper.title);
    Ok(paper)
  }
}

/// Collects the `name` of each entry in the record's `authors` list, up to
/// [`MAX_AUTHOR_NAMES`].
fn author_names(record: &RawRecord) -> Vec<String> {
  let Some(authors) = record.get("authors").and_then(Value::as_array) else {
    return Vec::new();
  };

  if authors.len() > MAX_AUTHOR_NAMES {
    debug!("Truncating {} authors to the first {MAX_AUTHOR_NAMES}", authors.len());
  }

  authors
    .iter()
    .take(MAX_AUTHOR_NAMES)
    .filter_map(|author| {
      let name = author.get("name").and_then(Value::as_str);
      if name.is_none() {
        warn!("Skipping author entry without a name: {author}");
      }
      name.map(str::to_owned)
    })
    .collect()
}
