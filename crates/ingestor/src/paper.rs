//! The canonical paper representation produced by every source.
//!
//! A [`Paper`] is built once per raw input record, held in memory for the duration of a run,
//! and written to the output dataset. Its JSON form keeps the field names downstream consumers
//! expect (`uniqueId`, `authorNames`, `citedByCount`, ...).
//!
//! `citedByCount` is never stored. It is derived from the paper's incoming citations whenever
//! it is read or serialized, so the two can not drift apart.
//!
//! # Examples
//!
//! ```
//! use ingestor::paper::{Paper, PaperId};
//!
//! let paper = Paper::new(PaperId::from(42), "Attention Is All You Need")
//!   .with_in_citations(vec![PaperId::from(7), PaperId::from(9)]);
//!
//! assert_eq!(paper.cited_by_count(), 2);
//! ```

use super::*;

/// Identifier of a paper as supplied by its source.
///
/// S2AG uses integer corpus ids, other feeds may use strings. Both forms serialize as the
/// bare JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaperId {
  /// A numeric identifier, such as an S2AG `corpusid`
  Integer(i64),
  /// A textual identifier
  Text(String),
}

impl Display for PaperId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PaperId::Integer(id) => write!(f, "{id}"),
      PaperId::Text(id) => write!(f, "{id}"),
    }
  }
}

impl From<i64> for PaperId {
  fn from(id: i64) -> Self { PaperId::Integer(id) }
}

impl From<&str> for PaperId {
  fn from(id: &str) -> Self { PaperId::Text(id.to_owned()) }
}

impl From<String> for PaperId {
  fn from(id: String) -> Self { PaperId::Text(id) }
}

/// A normalized academic paper.
///
/// All descriptive fields are public. The incoming citation list is private so that
/// [`Paper::cited_by_count`] always equals its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PaperJson", from = "PaperJson")]
pub struct Paper {
  /// Primary key of the paper; uniqueness is enforced by deduplication, not by the source
  pub unique_id:        PaperId,
  /// The paper's title, verbatim from the source
  pub title:            String,
  /// The paper's abstract (empty for sources that do not supply one)
  pub abstract_text:    String,
  /// Author names in source order
  pub author_names:     Vec<String>,
  /// Year of publication, if known
  pub publication_year: Option<i64>,
  /// The paper's DOI, if known
  pub doi:              Option<String>,
  /// Links to the paper
  pub urls:             Vec<String>,
  /// Identifiers of papers this paper cites
  pub out_citations:    Vec<PaperId>,
  /// Identifiers of papers citing this paper
  in_citations:         Vec<PaperId>,
}

impl Paper {
  /// Creates a paper with the given identifier and title and every other field empty.
  pub fn new(unique_id: PaperId, title: impl Into<String>) -> Self {
    Self {
      unique_id,
      title: title.into(),
      abstract_text: String::new(),
      author_names: Vec::new(),
      publication_year: None,
      doi: None,
      urls: Vec::new(),
      out_citations: Vec::new(),
      in_citations: Vec::new(),
    }
  }

  /// Returns this paper with its incoming citations replaced.
  pub fn with_in_citations(mut self, in_citations: Vec<PaperId>) -> Self {
    self.in_citations = in_citations;
    self
  }

  /// Identifiers of papers citing this paper.
  pub fn in_citations(&self) -> &[PaperId] { &self.in_citations }

  /// Number of papers citing this paper, always the length of [`Paper::in_citations`].
  pub fn cited_by_count(&self) -> usize { self.in_citations.len() }
}

/// On-disk JSON layout of a [`Paper`].
///
/// Field order and names match the published dataset format.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperJson {
  /// See [`Paper::unique_id`]
  unique_id:        PaperId,
  /// See [`Paper::title`]
  title:            String,
  /// See [`Paper::abstract_text`]
  #[serde(rename = "abstract")]
  abstract_text:    String,
  /// See [`Paper::author_names`]
  author_names:     Vec<String>,
  /// See [`Paper::publication_year`]
  publication_year: Option<i64>,
  /// See [`Paper::doi`]
  doi:              Option<String>,
  /// Written for consumers, ignored on read
  #[serde(default)]
  cited_by_count:   usize,
  /// See [`Paper::urls`]
  urls:             Vec<String>,
  /// See [`Paper::out_citations`]
  out_citations:    Vec<PaperId>,
  /// See [`Paper::in_citations`]
  in_citations:     Vec<PaperId>,
}

impl From<Paper> for PaperJson {
  fn from(paper: Paper) -> Self {
    Self {
      cited_by_count:   paper.cited_by_count(),
      unique_id:        paper.unique_id,
      title:            paper.title,
      abstract_text:    paper.abstract_text,
      author_names:     paper.author_names,
      publication_year: paper.publication_year,
      doi:              paper.doi,
      urls:             paper.urls,
      out_citations:    paper.out_citations,
      in_citations:     paper.in_citations,
    }
  }
}

impl From<PaperJson> for Paper {
  fn from(json: PaperJson) -> Self {
    if json.cited_by_count != json.in_citations.len() {
      trace!(
        "Recomputing citedByCount for {}: stored {}, actual {}",
        json.unique_id,
        json.cited_by_count,
        json.in_citations.len()
      );
    }
    Self {
      unique_id:        json.unique_id,
      title:            json.title,
      abstract_text:    json.abstract_text,
      author_names:     json.author_names,
      publication_year: json.publication_year,
      doi:              json.doi,
      urls:             json.urls,
      out_citations:    json.out_citations,
      in_citations:     json.in_citations,
    }
  }
}
