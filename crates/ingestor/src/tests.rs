use std::{cell::Cell, io::Write};

use flate2::{write::GzEncoder, Compression};
use serde_json::json;
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{
  config::{OutputConfig, S2agConfig, SourceConfig},
  dataset::read_papers,
  pipeline::{Pipeline, RunSummary},
  store::LocalStore,
};

/// A local store that counts how often it is asked to transfer.
struct RecordingStore {
  inner:     LocalStore,
  fetches:   Cell<usize>,
  publishes: Cell<usize>,
}

impl ObjectStore for RecordingStore {
  async fn fetch(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), IngestorError> {
    self.fetches.set(self.fetches.get() + 1);
    self.inner.fetch(bucket, key, local_path).await
  }

  async fn publish(
    &self,
    bucket: &str,
    local_path: &Path,
    key: &str,
  ) -> Result<(), IngestorError> {
    self.publishes.set(self.publishes.get() + 1);
    self.inner.publish(bucket, local_path, key).await
  }
}

/// A pipeline whose remote buckets and local cache all live in one temporary directory.
struct Fixture {
  dir:      TempDir,
  pipeline: Pipeline<RecordingStore>,
}

impl Fixture {
  fn new() -> Self {
    let dir = tempdir().unwrap();
    let config = Config {
      source: SourceConfig {
        bucket: "paper-sources".into(),
        s2ag:   S2agConfig {
          samples_key:        "s2ag/samples/papers/papers-sample.jsonl.gz".into(),
          samples_local_path: dir.path().join("cache/s2ag/papers-sample.jsonl.gz"),
        },
      },
      output: OutputConfig {
        bucket:     "paper-datasets".into(),
        key:        "s2ag/papers-dedup.jsonl.gz".into(),
        local_path: dir.path().join("output/papers-dedup.jsonl.gz"),
      },
      store: StoreConfig::Local { root: dir.path().join("remote") },
      ..Config::default()
    };
    let store = RecordingStore {
      inner:     LocalStore::new(dir.path().join("remote")),
      fetches:   Cell::new(0),
      publishes: Cell::new(0),
    };
    Self { dir, pipeline: Pipeline::new(config, store) }
  }

  fn store(&self) -> &RecordingStore { self.pipeline.store() }

  fn cache_path(&self) -> &Path { &self.pipeline.config().source.s2ag.samples_local_path }

  fn remote_sample(&self) -> PathBuf {
    let source = &self.pipeline.config().source;
    self.store().inner.object_path(&source.bucket, &source.s2ag.samples_key)
  }

  fn remote_output(&self) -> PathBuf {
    let output = &self.pipeline.config().output;
    self.store().inner.object_path(&output.bucket, &output.key)
  }
}

fn write_gz(path: &Path, lines: &[String]) {
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  let mut encoder = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::default());
  for line in lines {
    writeln!(encoder, "{line}").unwrap();
  }
  encoder.finish().unwrap();
}

fn s2ag_line(corpusid: i64, title: &str) -> String {
  json!({
    "corpusid": corpusid,
    "title": title,
    "authors": [{ "authorId": "1", "name": "Grace Hopper" }],
    "year": 1952,
    "externalids": { "DOI": format!("10.1000/{corpusid}") },
    "url": format!("https://www.semanticscholar.org/paper/{corpusid}")
  })
  .to_string()
}

#[traced_test]
#[tokio::test]
async fn test_run_publishes_deduplicated_dataset() -> anyhow::Result<()> {
  let fixture = Fixture::new();
  write_gz(&fixture.remote_sample(), &[
    s2ag_line(42, "First title"),
    s2ag_line(7, "Other paper"),
    s2ag_line(42, "Later title"),
  ]);

  let summary = fixture.pipeline.run().await?;
  assert_eq!(summary, RunSummary { loaded: 3, published: 2, duplicates: 1 });
  assert_eq!(fixture.store().fetches.get(), 1);
  assert_eq!(fixture.store().publishes.get(), 1);

  let published = read_papers(fixture.remote_output())?;
  assert_eq!(published.len(), 2);
  assert_eq!(published[0].unique_id, PaperId::Integer(42));
  assert_eq!(published[0].title, "First title");
  assert_eq!(published[0].doi.as_deref(), Some("10.1000/42"));
  assert_eq!(published[1].unique_id, PaperId::Integer(7));
  assert!(logs_contain("Deduplicating papers by the id."));
  Ok(())
}

#[tokio::test]
async fn test_fetch_skipped_when_cached() -> anyhow::Result<()> {
  let fixture = Fixture::new();
  write_gz(fixture.cache_path(), &[s2ag_line(1, "Cached")]);

  let papers = fixture.pipeline.load_papers("s2ag", Mode::Sample).await?;
  assert_eq!(papers.len(), 1);
  assert_eq!(papers[0].title, "Cached");
  assert_eq!(fixture.store().fetches.get(), 0);
  Ok(())
}

#[tokio::test]
async fn test_fetch_happens_once() -> anyhow::Result<()> {
  let fixture = Fixture::new();
  write_gz(&fixture.remote_sample(), &[s2ag_line(1, "Remote")]);

  fixture.pipeline.load_papers("s2ag", Mode::Sample).await?;
  assert_eq!(fixture.store().fetches.get(), 1);
  assert!(fixture.cache_path().exists());

  fixture.pipeline.load_papers("s2ag", Mode::Sample).await?;
  assert_eq!(fixture.store().fetches.get(), 1);
  Ok(())
}

#[tokio::test]
async fn test_papers_keep_input_order() -> anyhow::Result<()> {
  let fixture = Fixture::new();
  let ids = [9, 3, 27, 3, 1];
  write_gz(
    fixture.cache_path(),
    &ids.iter().map(|id| s2ag_line(*id, &format!("paper {id}"))).collect::<Vec<_>>(),
  );

  let papers = fixture.pipeline.load_papers("s2ag", Mode::Sample).await?;
  let loaded: Vec<_> = papers.iter().map(|p| p.unique_id.clone()).collect();
  assert_eq!(loaded, ids.map(PaperId::Integer));
  Ok(())
}

#[tokio::test]
async fn test_unsupported_input_fails_before_io() {
  let fixture = Fixture::new();

  let err = fixture.pipeline.load_papers("crossref", Mode::Sample).await.unwrap_err();
  assert!(matches!(err, IngestorError::UnsupportedSource(ref name) if name == "crossref"));

  let err = fixture.pipeline.load_papers("s2ag", Mode::Full).await.unwrap_err();
  assert!(matches!(err, IngestorError::UnsupportedMode(Mode::Full)));

  assert_eq!(fixture.store().fetches.get(), 0);
  assert!(!fixture.cache_path().exists());
}

#[tokio::test]
async fn test_missing_remote_sample() {
  let fixture = Fixture::new();
  let err = fixture.pipeline.run().await.unwrap_err();

  assert!(matches!(err, IngestorError::Transfer { ref bucket, .. } if bucket == "paper-sources"));
  assert_eq!(fixture.store().publishes.get(), 0);
}

#[tokio::test]
async fn test_malformed_line_aborts_run() {
  let fixture = Fixture::new();
  write_gz(fixture.cache_path(), &[s2ag_line(1, "Fine"), "{not json".to_owned()]);

  let err = fixture.pipeline.run().await.unwrap_err();
  assert!(matches!(err, IngestorError::Parse { line: 2, .. }));
  assert_eq!(fixture.store().publishes.get(), 0);
  assert!(!fixture.remote_output().exists());
}

#[tokio::test]
async fn test_invalid_utf8_line_aborts_run() -> anyhow::Result<()> {
  let fixture = Fixture::new();
  std::fs::create_dir_all(fixture.cache_path().parent().unwrap())?;
  let mut encoder =
    GzEncoder::new(std::fs::File::create(fixture.cache_path())?, Compression::default());
  writeln!(encoder, "{}", s2ag_line(1, "Fine"))?;
  encoder.write_all(b"{\"corpusid\": 2, \"title\": \"\xff\xfe\"}\n")?;
  encoder.finish()?;

  let err = fixture.pipeline.run().await.unwrap_err();
  assert!(matches!(err, IngestorError::Parse { line: 2, .. }));
  assert!(err.to_string().contains("line 2"));
  assert_eq!(fixture.store().publishes.get(), 0);
  Ok(())
}

#[tokio::test]
async fn test_output_write_failure_names_step_and_path() {
  let fixture = Fixture::new();
  write_gz(fixture.cache_path(), &[s2ag_line(1, "Fine")]);
  std::fs::write(fixture.dir.path().join("output"), b"not a directory").unwrap();

  let err = fixture.pipeline.run().await.unwrap_err();
  let output = &fixture.pipeline.config().output.local_path;
  assert!(matches!(err, IngestorError::File { ref path, .. } if path == output));

  let message = err.to_string();
  assert!(message.starts_with("writing output dataset"));
  assert!(message.contains(&output.display().to_string()));
  assert_eq!(fixture.store().publishes.get(), 0);
}

#[tokio::test]
async fn test_record_without_title_aborts_run() {
  let fixture = Fixture::new();
  write_gz(fixture.cache_path(), &[
    s2ag_line(1, "Fine"),
    s2ag_line(2, "Fine too"),
    json!({ "corpusid": 3, "authors": [] }).to_string(),
  ]);

  let err = fixture.pipeline.run().await.unwrap_err();
  assert!(matches!(err, IngestorError::InvalidRecord { line: 3, .. }));
  assert_eq!(err.missing_field(), Some("title"));
  assert_eq!(fixture.store().publishes.get(), 0);
  assert!(!fixture.dir.path().join("output").exists());
}
