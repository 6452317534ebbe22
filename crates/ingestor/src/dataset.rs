//! Reading and writing gzip-compressed JSON-lines datasets.
//!
//! Both the raw input sample and the published output use the same container: UTF-8 text,
//! one JSON object per line, gzip compressed. Input lines are decoded into [`RawRecord`]s for a
//! [`Normalizer`]; output lines hold serialized [`Paper`]s.
//!
//! # Examples
//!
//! ```no_run
//! use ingestor::{dataset, paper::{Paper, PaperId}};
//!
//! # fn example() -> Result<(), ingestor::errors::IngestorError> {
//! let papers = vec![Paper::new(PaperId::from(1), "A Paper")];
//! dataset::write_papers("out/papers.jsonl.gz", &papers)?;
//!
//! let back = dataset::read_papers("out/papers.jsonl.gz")?;
//! assert_eq!(back, papers);
//! # Ok(())
//! # }
//! ```

use std::{
  fs::File,
  io::{BufRead, BufReader, BufWriter, Write},
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use super::*;

/// Creates the parent directories of `path` if it has any.
pub(crate) fn create_parent_dirs(path: &Path) -> std::io::Result<()> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    trace!("Creating parent directories: {}", parent.display());
    std::fs::create_dir_all(parent)?;
  }
  Ok(())
}

/// Opens a gzip JSON-lines file and yields the bytes of each non-blank line with its 1-based
/// line number.
///
/// Lines are kept as bytes so that invalid UTF-8 is reported by the JSON decoder, against the line
/// it occurs on.
fn lines(
  path: &Path,
) -> Result<impl Iterator<Item = Result<(usize, Vec<u8>), IngestorError>>, IngestorError> {
  let failed = IngestorError::file("reading dataset", path);
  let file = File::open(path).map_err(&failed)?;
  let reader = BufReader::new(GzDecoder::new(file));
  Ok(reader.split(b'\n').enumerate().filter_map(move |(i, bytes)| match bytes {
    Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => None,
    Ok(bytes) => Some(Ok((i + 1, bytes))),
    Err(e) => Some(Err(failed(e))),
  }))
}

/// Lazily decodes the raw records of a gzip JSON-lines file.
///
/// Each item carries the 1-based line number of the record so callers can report which record
/// failed. Blank lines are skipped.
///
/// # Errors
///
/// Opening the file fails with [`IngestorError::File`]. Each item fails with
/// [`IngestorError::Parse`] if its line is not valid UTF-8 JSON, or [`IngestorError::File`] if the
/// decompressed stream can not be read.
pub fn read_records(
  path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<(usize, RawRecord), IngestorError>>, IngestorError> {
  let records = lines(path.as_ref())?.map(|item| -> Result<_, IngestorError> {
    let (line, bytes) = item?;
    let value = serde_json::from_slice::<Value>(&bytes)
      .map_err(|source| IngestorError::Parse { line, source })?;
    Ok((line, RawRecord::new(value)))
  });
  Ok(records)
}

/// Writes `papers` to `path` as gzip JSON lines, creating parent directories as needed.
///
/// Returns the number of papers written. File system failures are reported as
/// [`IngestorError::File`] naming `path`.
pub fn write_papers(path: impl AsRef<Path>, papers: &[Paper]) -> Result<usize, IngestorError> {
  let path = path.as_ref();
  let failed = IngestorError::file("writing output dataset", path);
  create_parent_dirs(path).map_err(&failed)?;

  let file = File::create(path).map_err(&failed)?;
  let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
  for paper in papers {
    let mut line = serde_json::to_vec(paper)?;
    line.push(b'\n');
    encoder.write_all(&line).map_err(&failed)?;
  }
  encoder.finish().and_then(|mut writer| writer.flush()).map_err(&failed)?;

  debug!("Wrote {} papers to {}", papers.len(), path.display());
  Ok(papers.len())
}

/// Reads a dataset previously written by [`write_papers`].
///
/// # Errors
///
/// Returns [`IngestorError::Parse`] naming the first line that is not a valid paper.
pub fn read_papers(path: impl AsRef<Path>) -> Result<Vec<Paper>, IngestorError> {
  lines(path.as_ref())?
    .map(|item| -> Result<Paper, IngestorError> {
      let (line, bytes) = item?;
      serde_json::from_slice(&bytes).map_err(|source| IngestorError::Parse { line, source })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  /// Writes raw lines into a gzip file.
  fn write_gz(path: &Path, lines: &[&str]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    for line in lines {
      writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
  }

  fn sample_papers() -> Vec<Paper> {
    let mut first = Paper::new(PaperId::from(42), "Ünïcödé title \"quoted\"")
      .with_in_citations(vec![PaperId::from(1), PaperId::from("two")]);
    first.author_names = vec!["A. Author".into(), "B. Author".into()];
    first.publication_year = Some(1999);
    first.doi = Some("10.1000/182".into());
    first.urls = vec!["https://example.org/42".into()];
    first.out_citations = vec![PaperId::from(7)];

    let second = Paper::new(PaperId::from("s-2"), "Second");
    vec![first, second]
  }

  #[test]
  fn test_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("deeper").join("papers.jsonl.gz");
    let papers = sample_papers();

    assert_eq!(write_papers(&path, &papers)?, 2);
    assert!(path.exists());

    let back = read_papers(&path)?;
    assert_eq!(back, papers);
    assert_eq!(back[0].cited_by_count(), 2);
    Ok(())
  }

  #[test]
  fn test_output_is_one_object_per_line() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("papers.jsonl.gz");
    write_papers(&path, &sample_papers())?;

    let mut text = String::new();
    std::io::Read::read_to_string(&mut GzDecoder::new(File::open(&path)?), &mut text)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0])?;
    assert_eq!(first["uniqueId"], 42);
    assert_eq!(first["citedByCount"], 2);
    Ok(())
  }

  #[test]
  fn test_read_records_numbers_lines() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("in.jsonl.gz");
    write_gz(&path, &[r#"{"corpusid": 1}"#, "", r#"{"corpusid": 2}"#]);

    let records = read_records(&path)?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, 1);
    assert_eq!(records[1].0, 3);
    assert_eq!(records[1].1.i64_at(&["corpusid"]), Some(2));
    Ok(())
  }

  #[test]
  fn test_read_records_reports_malformed_line() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("in.jsonl.gz");
    write_gz(&path, &[r#"{"corpusid": 1}"#, r#"{"corpusid": "#]);

    let err = read_records(&path)?.collect::<Result<Vec<_>, _>>().unwrap_err();
    assert!(matches!(err, IngestorError::Parse { line: 2, .. }));
    Ok(())
  }

  #[test]
  fn test_read_records_reports_invalid_utf8_line() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("in.jsonl.gz");
    let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
    encoder.write_all(b"{\"corpusid\": 1, \"title\": \"ok\"}\n")?;
    encoder.write_all(b"{\"corpusid\": 2, \"title\": \"\xff\xfe\"}\n")?;
    encoder.finish()?;

    let mut records = read_records(&path)?;
    assert_eq!(records.next().unwrap()?.0, 1);
    let err = records.next().unwrap().unwrap_err();
    assert!(matches!(err, IngestorError::Parse { line: 2, .. }));
    assert!(err.to_string().contains("line 2"));
    Ok(())
  }

  #[test]
  fn test_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.gz");
    let err = read_records(&path).err().unwrap();
    assert!(matches!(err, IngestorError::File { action: "reading dataset", ref path, .. }
      if path == &dir.path().join("nope.gz")));
  }

  #[test]
  fn test_write_failure_names_path() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("blocker"), b"a regular file").unwrap();
    let path = dir.path().join("blocker").join("papers.jsonl.gz");

    let err = write_papers(&path, &sample_papers()).unwrap_err();
    assert!(err.to_string().starts_with("writing output dataset"));
    assert!(err.to_string().contains(&path.display().to_string()));
  }
}
