//! Stable deduplication of papers by identifier.
//!
//! Source feeds do not guarantee that identifiers are unique. Deduplication keeps the first
//! paper observed for each identifier and silently drops the rest, leaving survivors in their
//! original relative order.
//!
//! # Examples
//!
//! ```
//! use ingestor::{
//!   dedup::dedup_papers,
//!   paper::{Paper, PaperId},
//! };
//!
//! let papers = vec![
//!   Paper::new(PaperId::from(1), "a"),
//!   Paper::new(PaperId::from(2), "b"),
//!   Paper::new(PaperId::from(1), "c"),
//! ];
//!
//! let titles: Vec<_> = dedup_papers(papers).into_iter().map(|p| p.title).collect();
//! assert_eq!(titles, ["a", "b"]);
//! ```

use std::{collections::HashSet, hash::Hash};

use super::*;

/// Keeps the first item for every distinct key, preserving input order.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
  K: Eq + Hash,
  F: FnMut(&T) -> K, {
  let mut seen = HashSet::with_capacity(items.len());
  items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Keeps the first paper for every distinct [`Paper::unique_id`].
pub fn dedup_papers(papers: Vec<Paper>) -> Vec<Paper> {
  let total = papers.len();
  let unique = dedup_by_key(papers, |paper| paper.unique_id.clone());
  debug!("Dropped {} duplicate papers out of {total}", total - unique.len());
  unique
}
